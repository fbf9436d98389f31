//! Base types for structure of a MAI archive.

use binrw::{BinRead, BinWrite};

/// Size of the fixed header at the start of every archive
pub const HEADER_SIZE: u64 = 0x10;

/// Size of a single flat entry record in the index
pub const RECORD_SIZE: u64 = 0x18;

/// Size of a single record in the directory table
pub const DIRECTORY_SIZE: u64 = 0x08;

/// Largest entry count an archive may declare
pub const MAX_ENTRIES: i32 = 0xFFFFF;

/// Length of the zero padded name in a flat entry record
pub const NAME_SIZE: usize = 0x10;

/// Length of the zero padded name in a directory record
pub const DIRECTORY_NAME_SIZE: usize = 0x04;

/// Directory level for which the directory table is honoured
pub const NESTED_DIRECTORY_LEVEL: u8 = 2;

/// MAI archive header
///
/// Every archive starts with the signature `MAI\n` followed by the total file size
/// and the number of flat entries. All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"MAI\x0a", little)]
pub struct ArcHeader {
    /// Size of the whole archive in bytes, must match the file
    pub total_size: u32,

    /// The number of flat entry records in the index
    pub entries: i32,

    /// Unused byte at offset 0x0C
    pub reserved: u8,

    /// Directory nesting level, the directory table is only read when this is 2
    pub dir_level: u8,

    /// The number of records in the directory table
    pub dir_entries: u16,
}

impl Default for ArcHeader {
    fn default() -> Self {
        Self {
            total_size: HEADER_SIZE as u32,
            entries: 0,
            reserved: 0,
            dir_level: 1,
            dir_entries: 0,
        }
    }
}

impl ArcHeader {
    /// Whether the directory table after the flat records should be parsed
    pub fn has_directories(&self) -> bool {
        self.dir_entries != 0 && self.dir_level == NESTED_DIRECTORY_LEVEL
    }

    /// Combined size of the flat record table and the directory table
    pub fn index_size(&self) -> u64 {
        self.entries.max(0) as u64 * RECORD_SIZE + self.dir_entries as u64 * DIRECTORY_SIZE
    }
}

/// Flat entry record
///
/// Defines a file stored in the archive, before its directory is resolved
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct ArcRecord {
    /// Zero padded name of the file without its extension
    pub name: [u8; NAME_SIZE],

    /// The offset to the data for this record from the start of the file
    pub offset: u32,

    /// The size of this record's data
    pub size: u32,
}

/// Directory table record
///
/// A directory owns every flat entry from `start` up to the start of the next directory
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct ArcDirectory {
    /// Zero padded directory name
    pub name: [u8; DIRECTORY_NAME_SIZE],

    /// Index of the first flat entry inside this directory
    pub start: i32,
}
