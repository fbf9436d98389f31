//! Types for reading CM images

use std::io::{Read, Seek, SeekFrom};

use binrw::BinRead;
use tracing::{debug, instrument};

use crate::{
    error::{Error, FormatMismatch, Result},
    rle,
    types::{CmHeader, FORMAT_VERSION, HEADER_SIZE},
};

/// A CM image with its pixel data decompressed.
///
/// Pixels are kept in storage order: bottom row first, `B,G,R` for 24 bit
/// images and palette indices for 8 bit images. Use
/// [`CmImage::to_rgb8`] for a top-down `R,G,B` buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmImage {
    pub(crate) header: CmHeader,
    pub(crate) palette: Option<Vec<[u8; 3]>>,
    pub(crate) pixels: Vec<u8>,
}

impl CmImage {
    /// Read a CM image, validating its header against the stream length.
    #[instrument(skip_all, err)]
    pub fn new<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.rewind()?;

        let header = CmHeader::read(&mut reader).map_err(|_| FormatMismatch::Header)?;
        if header.version != FORMAT_VERSION {
            return Err(FormatMismatch::Version(header.version).into());
        }
        if header.size as u64 != file_size {
            return Err(FormatMismatch::TotalSize {
                declared: header.size,
                actual: file_size,
            }
            .into());
        }
        if !matches!(header.bpp, 8 | 24) {
            return Err(Error::UnsupportedBitDepth(header.bpp));
        }

        let palette_size = header.colors as u64 * 3;
        let raw_palette = read_section(
            &mut reader,
            "palette",
            HEADER_SIZE as u64,
            palette_size,
            file_size,
        )?;
        let palette = (header.colors > 0).then(|| {
            raw_palette
                .chunks_exact(3)
                .map(|bgr| [bgr[2], bgr[1], bgr[0]])
                .collect::<Vec<_>>()
        });

        let data = read_section(
            &mut reader,
            "pixel data",
            header.data_offset as u64,
            header.data_length as u64,
            file_size,
        )?;

        let mut pixels = if header.compressed {
            rle::decode(&data, header.pixel_size())?
        } else {
            data
        };

        let expected = header.image_size();
        if pixels.len() < expected {
            return Err(Error::PixelDataLength {
                expected,
                actual: pixels.len(),
            });
        }
        pixels.truncate(expected);

        debug!(
            width = header.width,
            height = header.height,
            bpp = header.bpp,
            colors = header.colors,
            compressed = header.compressed,
            "read cm image"
        );

        Ok(Self {
            header,
            palette,
            pixels,
        })
    }

    /// Read a CM image from an in-memory buffer
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::new(std::io::Cursor::new(data))
    }

    /// Header the image was read with, or the defaults of a constructed image
    pub fn header(&self) -> &CmHeader {
        &self.header
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.header.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.header.height
    }

    /// Bits per pixel, either 8 or 24
    pub fn bpp(&self) -> u8 {
        self.header.bpp
    }

    /// Palette as `R,G,B` triples, if the image carries one
    pub fn palette(&self) -> Option<&[[u8; 3]]> {
        self.palette.as_deref()
    }

    /// Decompressed pixels in storage order
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

fn read_section<R: Read + Seek>(
    reader: &mut R,
    section: &'static str,
    offset: u64,
    length: u64,
    file_size: u64,
) -> Result<Vec<u8>> {
    if offset.checked_add(length).map_or(true, |end| end > file_size) {
        return Err(Error::DataPlacement {
            section,
            offset,
            length,
            file_size,
        });
    }

    reader.seek(SeekFrom::Start(offset))?;
    let mut data = vec![0; length as usize];
    reader.read_exact(&mut data)?;
    Ok(data)
}
