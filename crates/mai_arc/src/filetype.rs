//! Content type detection for archive entries.

use std::fmt;

/// Kind of data stored in an archive entry
///
/// Archives do not store extensions, so the type decides which extension an
/// entry receives when extracted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum FileType {
    /// CM raster image
    Cm,
    /// AM animated image
    Am,
    /// Windows bitmap
    Bmp,
    /// Mask image detected from its signature
    Msk,
    /// Mask image stored in `mask.arc`, which carries no usable signature
    MaskImage,
    /// Anything else
    #[default]
    Unknown,
}

/// Signature table evaluated in order, the first `(mask, value)` that matches wins.
pub const SIGNATURES: &[(u32, u32, FileType)] = &[
    (0xFFFF, 0x4D43, FileType::Cm),
    (0xFFFF, 0x4D41, FileType::Am),
    (0xFFFF, 0x4D42, FileType::Bmp),
    (0xFFFF, 0x10B4, FileType::Msk),
];

impl FileType {
    /// Detect the type of an entry from the little endian u32 at its start.
    pub fn detect(signature: u32) -> FileType {
        SIGNATURES
            .iter()
            .find(|(mask, value, _)| signature & mask == *value)
            .map_or(FileType::Unknown, |(_, _, kind)| *kind)
    }

    /// Extension given to extracted entries, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Cm => "cm",
            FileType::Am => "am",
            FileType::Bmp => "bmp",
            FileType::Msk | FileType::MaskImage => "msk",
            FileType::Unknown => "bin",
        }
    }

    /// Short tag naming the format
    pub fn tag(&self) -> &'static str {
        match self {
            FileType::Cm => "CM",
            FileType::Am => "AM",
            FileType::Bmp => "BMP",
            FileType::Msk => "MSK",
            FileType::MaskImage => "MSK/MAI",
            FileType::Unknown => "BIN",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
