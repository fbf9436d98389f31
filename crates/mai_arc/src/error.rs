//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is not a mai archive
    #[error("file is an invalid mai archive")]
    #[diagnostic(help("the file failed a structural check and is likely another format"))]
    InvalidArchive(#[from] FormatMismatch),

    /// entry {index} is corrupt
    #[error("entry {index} is corrupt: {reason}")]
    CorruptEntry {
        /// Position of the entry in the flat index
        index: usize,
        /// What is wrong with the entry
        reason: CorruptReason,
    },

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),

    /// name {0:?} cannot be stored in an archive
    #[error("name {0:?} cannot be stored in an archive")]
    InvalidEntryName(String),

    /// archive cannot hold {0} entries
    #[error("archive cannot hold {0} entries")]
    #[diagnostic(help("an archive holds between 1 and 1048575 entries"))]
    EntryCount(usize),

    /// archive would exceed 4 GiB
    #[error("archive would exceed 4 GiB")]
    ArchiveTooLarge,

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

impl Error {
    /// Returns true when the input was rejected as not being a mai archive at all.
    ///
    /// Callers probing several formats should treat this as "try the next parser".
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Error::InvalidArchive(_))
    }
}

/// Structural check that failed while probing a file
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum FormatMismatch {
    /// header is missing or has the wrong signature
    #[error("header is missing or has the wrong signature")]
    Header,

    /// declared size {declared} does not match file size {actual}
    #[error("declared size {declared} does not match file size {actual}")]
    TotalSize {
        /// Size stored in the header
        declared: u32,
        /// Size of the underlying file
        actual: u64,
    },

    /// entry count {0} is out of range
    #[error("entry count {0} is out of range")]
    EntryCount(i32),

    /// index of {index_size} bytes does not fit in {available} bytes
    #[error("index of {index_size} bytes does not fit in {available} bytes")]
    IndexBounds {
        /// Size of the record and directory tables
        index_size: u64,
        /// Bytes left after the header
        available: u64,
    },
}

/// Invariant violated by a single entry
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum CorruptReason {
    /// name is empty
    #[error("name is empty")]
    EmptyName,

    /// data at {offset:#x}+{size:#x} lies outside the {file_size} byte file
    #[error("data at {offset:#x}+{size:#x} lies outside the {file_size} byte file")]
    Placement {
        /// Start of the entry data
        offset: u32,
        /// Length of the entry data
        size: u32,
        /// Size of the archive
        file_size: u64,
    },

    /// path escapes the destination directory
    #[error("path {} escapes the destination directory", .0.display())]
    UnsafePath(PathBuf),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
