//! Base types for structure of a CM image.

use binrw::{BinRead, BinWrite};

/// Size of the fixed header, the palette starts right after it
pub const HEADER_SIZE: u32 = 0x20;

/// The only format version in use
pub const FORMAT_VERSION: u8 = 1;

/// CM image header
///
/// Always starts with "CM". All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"CM", little)]
pub struct CmHeader {
    /// Size of the whole file
    pub size: u32,

    /// Width in pixels
    pub width: u16,

    /// Height in pixels
    pub height: u16,

    /// Number of palette entries following the header
    pub colors: u16,

    /// Bits per pixel, 8 for indexed and 24 for true colour images
    pub bpp: u8,

    /// Whether the pixel data is run-length encoded
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub compressed: bool,

    /// Format version, always [`FORMAT_VERSION`]
    #[brw(pad_after = 1)]
    pub version: u8,

    /// Offset of the pixel data from the start of the file
    pub data_offset: u32,

    /// Length of the pixel data as stored
    #[brw(pad_after = 8)]
    pub data_length: u32,
}

impl Default for CmHeader {
    fn default() -> Self {
        Self {
            size: HEADER_SIZE,
            width: 0,
            height: 0,
            colors: 0,
            bpp: 24,
            compressed: true,
            version: FORMAT_VERSION,
            data_offset: HEADER_SIZE,
            data_length: 0,
        }
    }
}

impl CmHeader {
    /// Bytes per pixel
    pub fn pixel_size(&self) -> usize {
        self.bpp as usize / 8
    }

    /// Bytes of uncompressed pixel data covering the whole image
    pub fn image_size(&self) -> usize {
        self.width as usize * self.height as usize * self.pixel_size()
    }
}
