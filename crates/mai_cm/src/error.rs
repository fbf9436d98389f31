//! Error types that can be emitted from this library
//!

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

    /// File is not a CM image
    #[error("file is an invalid cm image")]
    InvalidImage(#[from] FormatMismatch),

    /// Pixel size of zero bytes
    #[error("pixel size must be at least one byte")]
    InvalidPixelSize,

    /// Input is not made of whole pixels
    #[error("{len} bytes is not a multiple of the {pixel_size} byte pixel size")]
    PixelAlignment {
        /// Length of the input
        len: usize,
        /// Size of one pixel
        pixel_size: usize,
    },

    /// A run-length segment reads past the compressed data
    #[error("segment at byte {position} needs {needed} bytes but only {available} remain")]
    #[diagnostic(help("the compressed data is truncated or data_length is wrong"))]
    TruncatedSegment {
        /// Offset of the segment tag in the compressed data
        position: usize,
        /// Bytes the segment declares after its tag
        needed: usize,
        /// Bytes left after the tag
        available: usize,
    },

    /// Palette or pixel data lies outside of the file
    #[error("{section} at offset {offset} with length {length} exceeds file size {file_size}")]
    DataPlacement {
        /// Part of the image being read
        section: &'static str,
        /// Start of the section
        offset: u64,
        /// Length of the section
        length: u64,
        /// Size of the file
        file_size: u64,
    },

    /// Decoded pixel data is shorter than the image
    #[error("image needs {expected} bytes of pixel data but {actual} were decoded")]
    PixelDataLength {
        /// Bytes needed for width * height pixels
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Palette index outside of the palette
    #[error("palette index {index} is outside of the {colors} color palette")]
    PaletteIndex {
        /// Index read from the pixel data
        index: u8,
        /// Number of palette entries
        colors: usize,
    },

    /// Bit depth other than 8 or 24
    #[error("unsupported bit depth {0}")]
    UnsupportedBitDepth(u8),

    /// Image too large for the format
    #[error("{0}")]
    Dimensions(String),
}

impl Error {
    /// Returns true when the input was rejected as not being a CM image at all.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Error::InvalidImage(_))
    }
}

/// Structural check that failed while probing a file
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum FormatMismatch {
    /// header is missing or has the wrong magic
    #[error("header is missing or has the wrong magic")]
    Header,

    /// unsupported format version {0}
    #[error("unsupported format version {0}")]
    Version(u8),

    /// declared size {declared} does not match file size {actual}
    #[error("declared size {declared} does not match file size {actual}")]
    TotalSize {
        /// Size stored in the header
        declared: u32,
        /// Size of the underlying file
        actual: u64,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
