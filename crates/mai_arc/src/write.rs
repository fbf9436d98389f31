//! Types for writing MAI archives
//!

use binrw::BinWrite;
use std::fmt::Debug;
use std::io::{self, Cursor, Seek, Write};
use tracing::{debug, instrument, Level};

use crate::error::{Error, Result};
use crate::name::encode_name;
use crate::types::{ArcHeader, ArcRecord, HEADER_SIZE, MAX_ENTRIES, NAME_SIZE, RECORD_SIZE};

#[derive(Debug, Clone)]
struct PendingRecord {
    name: [u8; NAME_SIZE],
    start: u64,
    size: u64,
}

/// MAI archive generator
///
/// Only flat archives are written, entry names may still contain `/` to keep
/// a directory structure.
///
/// ```
/// # fn doit() -> mai_arc::error::Result<()>
/// # {
/// # use mai_arc::ArcWriter;
/// use std::io::Write;
///
/// let mut arc = ArcWriter::new(std::io::Cursor::new(Vec::new()));
///
/// arc.start_file("hello_world")?;
/// arc.write_all(b"Hello, World!")?;
///
/// // Apply the changes you've made.
/// arc.finish()?;
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct ArcWriter<W: Write + Seek> {
    inner: W,
    writing_to_file: bool,
    records: Vec<PendingRecord>,
    data_block: Vec<u8>,
}

impl<W: Write + Seek> ArcWriter<W> {
    /// Initializes the archive.
    ///
    /// Before writing to this object, the [`ArcWriter::start_file`] function should be called.
    pub fn new(inner: W) -> ArcWriter<W> {
        ArcWriter {
            inner,
            writing_to_file: false,
            records: Vec::new(),
            data_block: Vec::new(),
        }
    }

    /// Returns true if a file is currently open for writing.
    pub const fn is_writing_file(&self) -> bool {
        self.writing_to_file
    }

    /// Start a new file, following writes become its data.
    ///
    /// The name is stored in Shift_JIS, zero padded or truncated to 16 bytes.
    #[instrument(skip(self, name), fields(name = %name.as_ref()), err)]
    pub fn start_file(&mut self, name: impl AsRef<str>) -> Result<()> {
        if self.writing_to_file {
            self.finish_file();
        }

        self.records.push(PendingRecord {
            name: encode_name(name.as_ref())?,
            start: self.data_block.len() as u64,
            size: 0,
        });
        self.writing_to_file = true;

        Ok(())
    }

    fn finish_file(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.size = self.data_block.len() as u64 - record.start;
        }
        self.writing_to_file = false;
    }

    /// Finish the last file and write the header, index and data
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        if self.writing_to_file {
            self.finish_file();
        }

        let count = self.records.len();
        if count == 0 || count > MAX_ENTRIES as usize {
            return Err(Error::EntryCount(count));
        }

        let data_start = HEADER_SIZE + count as u64 * RECORD_SIZE;
        let total_size = u32::try_from(data_start + self.data_block.len() as u64)
            .map_err(|_| Error::ArchiveTooLarge)?;

        let header = ArcHeader {
            total_size,
            entries: count as i32,
            ..Default::default()
        };
        header.write(&mut self.inner)?;

        for record in &self.records {
            ArcRecord {
                name: record.name,
                offset: (data_start + record.start) as u32,
                size: record.size as u32,
            }
            .write(&mut self.inner)?;
        }

        self.inner.write_all(&self.data_block)?;
        debug!(entries = count, total_size, "archive written");

        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for ArcWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size=buf.len()) )]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writing_to_file {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "No file has been started",
            ));
        }
        self.data_block.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[instrument(skip(self), err)]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Build a flat archive from `(name, data)` pairs, in the order given.
#[instrument(skip_all, err)]
pub fn build<I, N, D>(entries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (N, D)>,
    N: AsRef<str>,
    D: AsRef<[u8]>,
{
    let mut writer = ArcWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(name)?;
        writer.write_all(data.as_ref())?;
    }
    Ok(writer.finish()?.into_inner())
}
