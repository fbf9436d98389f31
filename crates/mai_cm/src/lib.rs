//! This library handles reading from and creating **CM** raster images.
//!
//! # CM Image Format Documentation
//!
//! CM images are the raster format of MAI archives. They hold either true colour
//! pixels or palette indices, optionally run-length encoded.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic                  | 2 bytes: "CM"                                              |
//! | 0x0002         | Size                   | 4 bytes: Size of the whole file                            |
//! | 0x0006         | Width                  | 2 bytes: Width in pixels                                   |
//! | 0x0008         | Height                 | 2 bytes: Height in pixels                                  |
//! | 0x000A         | Colors                 | 2 bytes: Number of palette entries                         |
//! | 0x000C         | Bits Per Pixel         | 1 byte: 8 or 24                                            |
//! | 0x000D         | Compressed             | 1 byte: Non-zero when the pixel data is run-length encoded |
//! | 0x000E         | Version                | 1 byte: Always 1                                           |
//! | 0x000F         | Reserved               | 1 byte: Unused                                             |
//! | 0x0010         | Data Offset            | 4 bytes: Offset of the pixel data                          |
//! | 0x0014         | Data Length            | 4 bytes: Length of the stored pixel data                   |
//! | 0x0018         | Reserved               | 8 bytes: Unused                                            |
//!
//! The palette follows the header with `Colors` entries of 3 bytes each, stored in
//! `B,G,R` order.
//!
//! ## Pixel Data
//!
//! Rows are stored bottom row first without padding. 24 bit pixels are stored in
//! `B,G,R` order, 8 bit pixels are indices into the palette, or grey levels when the
//! image has no palette. The compression scheme is described in [`rle`].
//!

pub mod error;
pub mod pixels;
pub mod read;
pub mod rle;
pub mod types;
pub mod write;

pub use read::CmImage;
pub use types::CmHeader;
pub use write::CmWriterOptions;
