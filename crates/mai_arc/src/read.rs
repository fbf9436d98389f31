//! Types for reading MAI archives
//!

use indexmap::IndexMap;
use std::{
    fmt::{self, Debug},
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
};
use tracing::instrument;

use crate::{
    error::{Error, FileNotFoundError, Result},
    filetype::FileType,
    resolve::{resolve, ArcIndex, ResolveOptions},
    types::ArcHeader,
};

/// Structure representing a resolved archive entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcEntry {
    /// Position of the record in the flat index
    pub index: usize,
    /// Name of the file as stored in its record
    pub name: Box<str>,
    /// Raw file name without padding. To be used when name was incorrectly decoded.
    pub name_raw: Box<[u8]>,
    /// Directory owning this entry, empty when the archive has no directory table
    pub directory: Box<str>,
    /// Name prefixed with its directory, separated by `/`
    pub path: Box<str>,
    /// Offset of the entry data from the start of the archive
    pub offset: u32,
    /// Size of the entry data
    pub size: u32,
    /// Type detected from the entry data, or forced for the whole archive
    pub file_type: FileType,
}

impl ArcEntry {
    /// Logical path with the extension of the detected type appended
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.path, self.file_type.extension())
    }
}

/// A struct for reading an entry from a MAI archive
pub struct ArcFile<'a, R: Read + Seek> {
    entry: &'a ArcEntry,
    reader: io::Take<&'a mut R>,
}

impl<'a, R: Read + Seek> Debug for ArcFile<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ArcFile({:#?})", self.entry)
    }
}

/// Methods for retrieving information on archive entries
impl<'a, R: Read + Seek> ArcFile<'a, R> {
    /// Get the logical path of the file, prefixed with its directory
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`). Use [`ArcArchive::extract_all`] which
    /// refuses such entries.
    pub fn name(&self) -> &str {
        &self.entry.path
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u64 {
        self.entry.size as u64
    }

    /// Get the starting offset of the data of the file
    pub fn data_start(&self) -> u64 {
        self.entry.offset as u64
    }

    /// Get the type detected for this file
    pub fn file_type(&self) -> FileType {
        self.entry.file_type
    }

    /// Get the resolved entry backing this file
    pub fn entry(&self) -> &ArcEntry {
        self.entry
    }
}

impl<R: Read + Seek> Read for ArcFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// MAI archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_arc_contents(reader: impl Read + Seek) -> mai_arc::error::Result<()> {
///     let mut arc = mai_arc::ArcArchive::new(reader)?;
///
///     for i in 0..arc.len() {
///         let mut file = arc.by_index(i)?;
///         println!("Filename: {}", file.name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct ArcArchive<R> {
    reader: R,
    index: ArcIndex,
    names: IndexMap<Box<str>, usize>,
}

impl<R> Debug for ArcArchive<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ArcArchive")
            .field("header", &self.index.header)
            .field("entries", &self.index.entries.len())
            .finish()
    }
}

impl ArcArchive<BufReader<File>> {
    /// Open the archive stored at `path`.
    ///
    /// The options are derived from the file name, see [`ResolveOptions::for_archive_path`].
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = ResolveOptions::for_archive_path(&path);
        let file = File::open(path.as_ref())?;
        Self::with_options(BufReader::new(file), options)
    }
}

impl<R> ArcArchive<R> {
    /// Total size of the entry data in the archive
    pub fn data_size(&self) -> u64 {
        self.index.entries.iter().map(|e| e.size as u64).sum()
    }

    /// Size of the archive in bytes
    pub fn file_size(&self) -> u64 {
        self.index.file_size
    }

    /// Header the archive was resolved from
    pub fn header(&self) -> &ArcHeader {
        &self.index.header
    }

    /// Number of entries contained in this archive.
    pub fn len(&self) -> usize {
        self.index.entries.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All resolved entries in on-disk order
    pub fn entries(&self) -> &[ArcEntry] {
        &self.index.entries
    }

    /// Returns an iterator over the logical paths of all entries in this archive.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.index.entries.iter().map(|e| e.path.as_ref())
    }

    /// Get the index of a file entry by logical path, if it's present.
    ///
    /// When several entries share a path the first one is returned.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Get the logical path of a file entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.index.entries.get(index).map(|e| e.path.as_ref())
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> ArcArchive<R> {
    /// Read a MAI archive resolving the files it contains.
    pub fn new(reader: R) -> Result<ArcArchive<R>> {
        Self::with_options(reader, ResolveOptions::default())
    }

    /// Read a MAI archive with explicit resolve options.
    pub fn with_options(mut reader: R, options: ResolveOptions) -> Result<ArcArchive<R>> {
        let index = resolve(&mut reader, &options)?;

        let mut names = IndexMap::with_capacity(index.entries.len());
        for entry in &index.entries {
            names.entry(entry.path.clone()).or_insert(entry.index);
        }

        Ok(ArcArchive {
            reader,
            index,
            names,
        })
    }

    /// Search for a file entry by logical path
    pub fn by_name(&mut self, name: &str) -> Result<ArcFile<'_, R>> {
        let Some(index) = self.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&mut self, file_number: usize) -> Result<ArcFile<'_, R>> {
        let entry = self
            .index
            .entries
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        self.reader.seek(SeekFrom::Start(entry.offset as u64))?;

        Ok(ArcFile {
            entry,
            reader: self.reader.by_ref().take(entry.size as u64),
        })
    }

    /// Read the whole data of the entry at `file_number`
    pub fn read_entry(&mut self, file_number: usize) -> Result<Vec<u8>> {
        let mut file = self.by_index(file_number)?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;

        if data.len() as u64 != file.size() {
            return Err(Error::IOError(io::ErrorKind::UnexpectedEof.into()));
        }
        Ok(data)
    }
}

#[cfg(test)]
mod test {
    use std::io::prelude::*;
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use crate::error::{CorruptReason, Error, FormatMismatch, Result};
    use crate::filetype::FileType;
    use crate::read::ArcArchive;
    use crate::resolve::ResolveOptions;

    #[rustfmt::skip]
    fn single_entry() -> Vec<u8> {
        vec![
            // Header
            0x4D, 0x41, 0x49, 0x0A,
            0x34, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
            // Records
            0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x28, 0x00, 0x00, 0x00,
            0x0C, 0x00, 0x00, 0x00,
            // Data
            0x42, 0x4D, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]
    }

    #[test]
    fn read_invalid_signature() {
        let mut input = single_entry();
        input[3] = 0x00;

        let archive = ArcArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::InvalidArchive(FormatMismatch::Header))
        ));
    }

    #[test]
    fn read_truncated_header() {
        let archive = ArcArchive::new(Cursor::new(vec![0x4D, 0x41, 0x49, 0x0A, 0x08]));
        assert!(archive.is_err_and(|e| e.is_format_mismatch()));
    }

    #[test]
    fn read_single_entry() -> Result<()> {
        let mut archive = ArcArchive::new(Cursor::new(single_entry()))?;
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.file_size(), 0x34);

        let entry = &archive.entries()[0];
        assert_eq!(entry.path.as_ref(), "hello");
        assert_eq!(entry.file_type, FileType::Bmp);
        assert_eq!(entry.file_name(), "hello.bmp");

        let mut buffer = Vec::new();
        let mut file = archive.by_name("hello")?;
        assert_eq!(file.data_start(), 0x28);
        file.read_to_end(&mut buffer)?;
        assert_eq!(buffer.len(), 12);
        assert_eq!(&buffer[..2], b"BM");

        Ok(())
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut input = single_entry();
        input.push(0x00);

        let archive = ArcArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::InvalidArchive(FormatMismatch::TotalSize {
                declared: 0x34,
                actual: 0x35
            }))
        ));
    }

    #[test]
    fn entry_count_bounds() {
        for count in [0i32, -1, 0x100000] {
            let mut input = single_entry();
            input[8..12].copy_from_slice(&count.to_le_bytes());

            let archive = ArcArchive::new(Cursor::new(input));
            assert!(
                matches!(archive, Err(Error::InvalidArchive(FormatMismatch::EntryCount(c))) if c == count)
            );
        }
    }

    #[test]
    fn index_must_fit_in_file() {
        let mut input = single_entry();
        input[8] = 0x02;

        let archive = ArcArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::InvalidArchive(FormatMismatch::IndexBounds { .. }))
        ));
    }

    #[test]
    fn empty_name_is_corrupt() {
        // "\0ello" counts as empty, bytes after the first NUL are never read
        let mut input = single_entry();
        input[0x10] = 0x00;

        let archive = ArcArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::CorruptEntry {
                index: 0,
                reason: CorruptReason::EmptyName
            })
        ));
    }

    #[test]
    fn placement_outside_file_is_corrupt() {
        let mut input = single_entry();
        input[0x24] = 0x0D;

        let archive = ArcArchive::new(Cursor::new(input));
        let Err(error) = archive else {
            panic!("archive with misplaced data was accepted");
        };
        assert!(!error.is_format_mismatch());
        assert!(matches!(
            error,
            Error::CorruptEntry {
                reason: CorruptReason::Placement { .. },
                ..
            }
        ));
    }

    #[test]
    fn forced_type_skips_detection() -> Result<()> {
        let archive = ArcArchive::with_options(
            Cursor::new(single_entry()),
            ResolveOptions::builder()
                .type_override(FileType::MaskImage)
                .build(),
        )?;

        assert_eq!(archive.entries()[0].file_type, FileType::MaskImage);
        assert_eq!(archive.entries()[0].file_name(), "hello.msk");

        Ok(())
    }

    #[test]
    fn missing_entries_are_reported() -> Result<()> {
        let mut archive = ArcArchive::new(Cursor::new(single_entry()))?;
        assert!(archive.by_index(1).is_err());
        assert!(archive.by_name("world").is_err());
        Ok(())
    }
}
