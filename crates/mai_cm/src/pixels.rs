//! Conversion between stored pixels and top-down `R,G,B` buffers

use crate::{
    error::{Error, Result},
    read::CmImage,
    types::CmHeader,
};

/// Most palette entries an 8 bit image can address
pub const MAX_COLORS: usize = 256;

impl CmImage {
    /// Expand the image into a top-down `R,G,B` buffer.
    ///
    /// 8 bit images without a palette are treated as greyscale.
    pub fn to_rgb8(&self) -> Result<Vec<u8>> {
        let row_size = self.header.width as usize * self.header.pixel_size();
        let mut rgb = Vec::with_capacity(self.header.width as usize * self.header.height as usize * 3);
        if row_size == 0 {
            return Ok(rgb);
        }

        for row in self.pixels.chunks_exact(row_size).rev() {
            match self.header.bpp {
                24 => {
                    for bgr in row.chunks_exact(3) {
                        rgb.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
                    }
                }
                8 => {
                    for &index in row {
                        rgb.extend_from_slice(&self.color(index)?);
                    }
                }
                bpp => return Err(Error::UnsupportedBitDepth(bpp)),
            }
        }

        Ok(rgb)
    }

    fn color(&self, index: u8) -> Result<[u8; 3]> {
        match &self.palette {
            Some(palette) => palette
                .get(index as usize)
                .copied()
                .ok_or(Error::PaletteIndex {
                    index,
                    colors: palette.len(),
                }),
            None => Ok([index; 3]),
        }
    }

    /// Create a 24 bit image from a top-down `R,G,B` buffer
    pub fn from_rgb8(width: u16, height: u16, rgb: &[u8]) -> Result<Self> {
        let row_size = width as usize * 3;
        check_length(row_size * height as usize, rgb.len())?;

        let mut pixels = Vec::with_capacity(rgb.len());
        if row_size > 0 {
            for row in rgb.chunks_exact(row_size).rev() {
                for px in row.chunks_exact(3) {
                    pixels.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
        }

        Ok(Self {
            header: CmHeader {
                width,
                height,
                bpp: 24,
                colors: 0,
                ..Default::default()
            },
            palette: None,
            pixels,
        })
    }

    /// Create an 8 bit image from top-down palette indices.
    ///
    /// An empty palette produces a greyscale image.
    pub fn from_indexed(
        width: u16,
        height: u16,
        palette: &[[u8; 3]],
        indices: &[u8],
    ) -> Result<Self> {
        if palette.len() > MAX_COLORS {
            return Err(Error::Dimensions(format!(
                "palette has {} colors, at most {MAX_COLORS} are supported",
                palette.len()
            )));
        }

        let row_size = width as usize;
        check_length(row_size * height as usize, indices.len())?;

        if !palette.is_empty() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= palette.len()) {
                return Err(Error::PaletteIndex {
                    index,
                    colors: palette.len(),
                });
            }
        }

        let mut pixels = Vec::with_capacity(indices.len());
        if row_size > 0 {
            for row in indices.chunks_exact(row_size).rev() {
                pixels.extend_from_slice(row);
            }
        }

        Ok(Self {
            header: CmHeader {
                width,
                height,
                bpp: 8,
                colors: palette.len() as u16,
                ..Default::default()
            },
            palette: (!palette.is_empty()).then(|| palette.to_vec()),
            pixels,
        })
    }
}

fn check_length(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::PixelDataLength { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::read::CmImage;

    #[rustfmt::skip]
    const RGB: [u8; 12] = [
        0xFF, 0x00, 0x00,  0x00, 0xFF, 0x00,
        0x00, 0x00, 0xFF,  0x10, 0x20, 0x30,
    ];

    #[test]
    fn rgb_is_stored_bottom_up_as_bgr() -> Result<()> {
        let image = CmImage::from_rgb8(2, 2, &RGB)?;

        #[rustfmt::skip]
        let expected = [
            0xFF, 0x00, 0x00,  0x30, 0x20, 0x10,
            0x00, 0x00, 0xFF,  0x00, 0xFF, 0x00,
        ];
        assert_eq!(image.pixels(), &expected);
        assert_eq!(image.to_rgb8()?, RGB);

        Ok(())
    }

    #[test]
    fn rgb_length_must_match() {
        assert!(matches!(
            CmImage::from_rgb8(2, 2, &RGB[..9]),
            Err(Error::PixelDataLength {
                expected: 12,
                actual: 9
            })
        ));
    }

    #[test]
    fn indexed_expands_palette() -> Result<()> {
        let palette = [[1, 2, 3], [4, 5, 6]];
        let image = CmImage::from_indexed(2, 1, &palette, &[1, 0])?;

        assert_eq!(image.header().colors, 2);
        assert_eq!(image.to_rgb8()?, vec![4, 5, 6, 1, 2, 3]);

        Ok(())
    }

    #[test]
    fn indexed_without_palette_is_grey() -> Result<()> {
        let image = CmImage::from_indexed(1, 2, &[], &[0x40, 0x80])?;

        assert_eq!(image.palette(), None);
        assert_eq!(image.pixels(), &[0x80, 0x40]);
        assert_eq!(
            image.to_rgb8()?,
            vec![0x40, 0x40, 0x40, 0x80, 0x80, 0x80]
        );

        Ok(())
    }

    #[test]
    fn indexed_rejects_index_outside_palette() {
        assert!(matches!(
            CmImage::from_indexed(2, 1, &[[0, 0, 0]], &[0, 3]),
            Err(Error::PaletteIndex {
                index: 3,
                colors: 1
            })
        ));
    }

    #[test]
    fn indexed_rejects_large_palette() {
        let palette = vec![[0, 0, 0]; 257];
        assert!(matches!(
            CmImage::from_indexed(1, 1, &palette, &[0]),
            Err(Error::Dimensions(_))
        ));
    }

    #[test]
    fn empty_image() -> Result<()> {
        let image = CmImage::from_rgb8(0, 5, &[])?;
        assert_eq!(image.to_rgb8()?, Vec::<u8>::new());
        Ok(())
    }
}
