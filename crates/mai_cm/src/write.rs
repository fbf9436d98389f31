//! Types for creating CM images

use std::borrow::Cow;
use std::io::{Cursor, Write};

use binrw::BinWrite;
use bon::Builder;
use tracing::instrument;

use crate::{
    error::{Error, Result},
    read::CmImage,
    rle,
    types::{CmHeader, FORMAT_VERSION, HEADER_SIZE},
};

/// Options for how the CM image should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct CmWriterOptions {
    /// Run-length encode the pixel data
    #[builder(default = true)]
    pub compress: bool,
}

impl Default for CmWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CmImage {
    /// Serialize the image into a new buffer
    #[instrument(skip(self), fields(width = self.header.width, height = self.header.height), err)]
    pub fn to_bytes(&self, options: CmWriterOptions) -> Result<Vec<u8>> {
        let payload = if options.compress {
            Cow::Owned(rle::encode(&self.pixels, self.header.pixel_size())?)
        } else {
            Cow::Borrowed(self.pixels.as_slice())
        };

        let palette = self.palette.as_deref().unwrap_or_default();
        let colors = u16::try_from(palette.len())
            .map_err(|_| Error::Dimensions(format!("{} palette entries", palette.len())))?;

        let data_offset = HEADER_SIZE + colors as u32 * 3;
        let size = u32::try_from(payload.len())
            .ok()
            .and_then(|length| data_offset.checked_add(length))
            .ok_or_else(|| {
                Error::Dimensions(format!(
                    "{} bytes of pixel data do not fit in a cm image",
                    payload.len()
                ))
            })?;

        let header = CmHeader {
            size,
            colors,
            compressed: options.compress,
            version: FORMAT_VERSION,
            data_offset,
            data_length: size - data_offset,
            ..self.header
        };

        let mut out = Cursor::new(Vec::with_capacity(size as usize));
        header.write(&mut out)?;

        let mut out = out.into_inner();
        for [r, g, b] in palette {
            out.extend_from_slice(&[*b, *g, *r]);
        }
        out.extend_from_slice(&payload);

        Ok(out)
    }

    /// Write the image to `writer`
    pub fn write<W: Write>(&self, writer: &mut W, options: CmWriterOptions) -> Result<()> {
        writer.write_all(&self.to_bytes(options)?)?;
        Ok(())
    }
}
