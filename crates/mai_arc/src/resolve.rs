//! Resolution of the flat on-disk index into entries with directory-prefixed paths.

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use binrw::{BinRead, BinResult};
use bon::Builder;
use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, instrument};

use crate::error::{CorruptReason, Error, FormatMismatch, Result};
use crate::filetype::FileType;
use crate::name::decode_name;
use crate::read::ArcEntry;
use crate::types::{ArcDirectory, ArcHeader, ArcRecord, HEADER_SIZE, MAX_ENTRIES};

/// Archive name whose entries are all mask images, whatever their data looks like
pub const MASK_ARCHIVE_NAME: &str = "mask.arc";

/// Options for how an archive index is resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct ResolveOptions {
    /// Type given to every entry instead of detecting it from the entry data
    pub type_override: Option<FileType>,
}

impl ResolveOptions {
    /// Options for the archive stored at `path`.
    ///
    /// An archive named `mask.arc` (in any case) forces [`FileType::MaskImage`] on all entries.
    pub fn for_archive_path(path: impl AsRef<Path>) -> Self {
        let is_mask = path
            .as_ref()
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.eq_ignore_ascii_case(MASK_ARCHIVE_NAME));

        Self {
            type_override: is_mask.then_some(FileType::MaskImage),
        }
    }
}

/// The validated index of an archive
#[derive(Debug, Clone)]
pub struct ArcIndex {
    /// Header as read from the file
    pub header: ArcHeader,
    /// Size of the archive in bytes
    pub file_size: u64,
    /// Entries in on-disk order
    pub entries: Vec<ArcEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directory {
    name: String,
    start: i64,
}

impl From<ArcDirectory> for Directory {
    fn from(value: ArcDirectory) -> Self {
        Self {
            name: decode_name(&value.name).into_owned(),
            start: value.start as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState<'a> {
    NoDirectories,
    BeforeFirstBoundary,
    InDirectory(&'a str),
}

/// Walks flat records while tracking the directory that owns each of them.
///
/// Yields `(index, record, directory)`, where the directory is empty for records
/// that come before the first directory boundary or when there is no directory table.
pub(crate) struct FlatEntries<'a> {
    records: std::iter::Enumerate<std::slice::Iter<'a, ArcRecord>>,
    directories: &'a [Directory],
    next: usize,
    next_boundary: i64,
    entry_count: i64,
    state: CursorState<'a>,
}

impl<'a> FlatEntries<'a> {
    pub(crate) fn new(records: &'a [ArcRecord], directories: &'a [Directory]) -> Self {
        let entry_count = records.len() as i64;
        let (state, next_boundary) = match directories.first() {
            Some(first) => (CursorState::BeforeFirstBoundary, first.start),
            None => (CursorState::NoDirectories, entry_count),
        };

        Self {
            records: records.iter().enumerate(),
            directories,
            next: 0,
            next_boundary,
            entry_count,
            state,
        }
    }

    fn directory_for(&mut self, index: i64) -> &'a str {
        // Several boundaries may be crossed at once when directories are empty
        while index >= self.next_boundary && self.next < self.directories.len() {
            self.state = CursorState::InDirectory(&self.directories[self.next].name);
            self.next += 1;
            self.next_boundary = self
                .directories
                .get(self.next)
                .map_or(self.entry_count, |d| d.start);
        }

        match self.state {
            CursorState::InDirectory(name) => name,
            CursorState::NoDirectories | CursorState::BeforeFirstBoundary => "",
        }
    }
}

impl<'a> Iterator for FlatEntries<'a> {
    type Item = (usize, &'a ArcRecord, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, record) = self.records.next()?;
        let directory = self.directory_for(index as i64);
        Some((index, record, directory))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

/// Resolve the index of the archive read by `reader`.
///
/// Any failed structural check yields [`Error::InvalidArchive`]; an entry breaking an
/// invariant yields [`Error::CorruptEntry`]. Both reject the archive as a whole.
#[instrument(skip(reader), err)]
pub fn resolve<R: Read + Seek>(reader: &mut R, options: &ResolveOptions) -> Result<ArcIndex> {
    let file_size = reader.seek(SeekFrom::End(0))?;
    reader.rewind()?;

    let header = ArcHeader::read(reader).map_err(|_| FormatMismatch::Header)?;

    if header.total_size as u64 != file_size {
        return Err(FormatMismatch::TotalSize {
            declared: header.total_size,
            actual: file_size,
        }
        .into());
    }

    if header.entries <= 0 || header.entries > MAX_ENTRIES {
        return Err(FormatMismatch::EntryCount(header.entries).into());
    }

    let index_size = header.index_size();
    let available = file_size - HEADER_SIZE;
    if index_size > available {
        return Err(FormatMismatch::IndexBounds {
            index_size,
            available,
        }
        .into());
    }

    let mut index = vec![0u8; index_size as usize];
    reader.seek(SeekFrom::Start(HEADER_SIZE))?;
    reader.read_exact(&mut index)?;

    let mut table = Cursor::new(index);
    let records = (0..header.entries)
        .map(|_| ArcRecord::read(&mut table))
        .collect::<BinResult<Vec<_>>>()?;

    let directories = if header.has_directories() {
        (0..header.dir_entries)
            .map(|_| ArcDirectory::read(&mut table).map(Directory::from))
            .collect::<BinResult<Vec<_>>>()?
    } else {
        Vec::new()
    };

    let mut entries = Vec::with_capacity(records.len());
    for (index, record, directory) in FlatEntries::new(&records, &directories) {
        let name = decode_name(&record.name);
        if name.is_empty() {
            return Err(Error::CorruptEntry {
                index,
                reason: CorruptReason::EmptyName,
            });
        }

        if record.offset as u64 + record.size as u64 > file_size {
            return Err(Error::CorruptEntry {
                index,
                reason: CorruptReason::Placement {
                    offset: record.offset,
                    size: record.size,
                    file_size,
                },
            });
        }

        let file_type = match options.type_override {
            Some(forced) => forced,
            None => FileType::detect(read_signature(reader, record.offset as u64, file_size)?),
        };

        let path = if directory.is_empty() {
            name.to_string()
        } else {
            format!("{directory}/{name}")
        };

        debug!(index, %path, offset = record.offset, size = record.size, %file_type, "resolved entry");

        let end = record.name.iter().position(|&b| b == 0).unwrap_or(record.name.len());
        entries.push(ArcEntry {
            index,
            name: name.into(),
            name_raw: record.name[..end].into(),
            directory: directory.into(),
            path: path.into(),
            offset: record.offset,
            size: record.size,
            file_type,
        });
    }

    Ok(ArcIndex {
        header,
        file_size,
        entries,
    })
}

/// Read the little endian u32 at `offset`, zero filling past the end of the file.
fn read_signature<R: Read + Seek>(reader: &mut R, offset: u64, file_size: u64) -> Result<u32> {
    reader.seek(SeekFrom::Start(offset))?;
    if file_size - offset >= 4 {
        return Ok(reader.read_u32::<LittleEndian>()?);
    }

    let mut tail = Vec::with_capacity(4);
    reader.by_ref().take(4).read_to_end(&mut tail)?;
    let mut signature = [0u8; 4];
    signature[..tail.len()].copy_from_slice(&tail);
    Ok(u32::from_le_bytes(signature))
}
