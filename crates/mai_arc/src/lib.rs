//! This library handles reading from and creating **MAI** resource archives.
//!
//! # ARC Archive Format Documentation
//!
//! A MAI archive bundles game assets (images, masks, animations) into a single file,
//! typically with the `.arc` extension. Entries are addressed by a fixed-size index
//! right after the header and may optionally be grouped into directories.
//!
//! ## File Structure
//!
//! An archive consists of a header, the flat entry records, an optional directory
//! table, and the entry data.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Signature              | 4 bytes: 0x0A49414D ("MAI\n")                              |
//! | 0x0004         | Total Size             | 4 bytes: Size of the whole file                            |
//! | 0x0008         | Entry Count            | 4 bytes: Signed number of flat entries                     |
//! | 0x000C         | Reserved               | 1 byte: Unused                                             |
//! | 0x000D         | Directory Level        | 1 byte: The directory table is used when this is 2         |
//! | 0x000E         | Directory Count        | 2 bytes: Number of directory table records                 |
//!
//! ### Header
//!
//! - **Signature**: `MAI` followed by a line feed.
//! - **Total Size**: must equal the size of the file, anything else is not an archive.
//! - **Entry Count**: between 1 and `0xFFFFF` inclusive.
//! - **Directory Level** / **Directory Count**: when the level is 2 and the count is not
//!   zero, a directory table follows the flat entry records.
//!
//! ### Flat Entry Records
//!
//! Starting at `0x10`, one record per entry:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 16 bytes: Shift_JIS name, zero padded, no extension     |
//! | 0x0010         | Data Offset            | 4 bytes: Offset of the data from the start of the file  |
//! | 0x0014         | Data Size              | 4 bytes: Size of the data                               |
//!
//! ### Directory Table
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 4 bytes: Zero padded directory name                     |
//! | 0x0004         | Start Index            | 4 bytes: Index of the first flat entry it owns          |
//!
//! A directory owns the flat entries from its start index up to the start index of the
//! next directory, or up to the entry count for the last one. Entries before the first
//! start index belong to no directory.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.arc`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Entry Types**: extensions are not stored, they are derived from the low 16 bits of
//!   the first four bytes of each entry, see [`FileType`]
//!

pub mod container;
pub mod error;
pub mod filetype;
pub mod name;
pub mod read;
pub mod resolve;
pub mod types;
pub mod write;

pub use container::{build_from_directory, ExtractOptions, ExtractReport};
pub use filetype::FileType;
pub use read::{ArcArchive, ArcEntry};
pub use resolve::ResolveOptions;
pub use write::{build, ArcWriter};
