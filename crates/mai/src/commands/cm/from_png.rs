use clap::Args;
use image::ImageFormat;
use mai_cm::{CmImage, CmWriterOptions};
use miette::{miette, Context, IntoDiagnostic, Result};
use png::{BitDepth, ColorType, Transformations};
use std::{
    fs::File,
    io::Cursor,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use super::{files_with_extension, output_path};

#[derive(Args)]
pub struct FromPngArgs {
    /// A directory containing PNG images
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,
}

fn dimensions(width: u32, height: u32) -> Result<(u16, u16)> {
    let too_large = || miette!("{width}x{height} is too large for a cm image");
    Ok((
        u16::try_from(width).map_err(|_| too_large())?,
        u16::try_from(height).map_err(|_| too_large())?,
    ))
}

/// Spread packed palette indices into one byte per pixel
fn unpack_indices(data: &[u8], line_size: usize, width: usize, depth: BitDepth) -> Vec<u8> {
    let bits = depth as usize;
    if bits == 8 {
        return data
            .chunks_exact(line_size)
            .flat_map(|row| &row[..width])
            .copied()
            .collect();
    }

    let mask = (1u8 << bits) - 1;
    let per_byte = 8 / bits;
    data.chunks_exact(line_size)
        .flat_map(|row| {
            (0..width).map(move |x| {
                let shift = 8 - bits * (x % per_byte + 1);
                (row[x / per_byte] >> shift) & mask
            })
        })
        .collect()
}

/// Convert a PNG into a CM image.
///
/// Palette images become 8 bit images keeping their palette, everything else
/// becomes a 24 bit image.
pub fn cm_from_png(data: &[u8]) -> Result<CmImage> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder.read_info().into_diagnostic()?;

    if reader.info().color_type != ColorType::Indexed {
        let rgb = image::load_from_memory_with_format(data, ImageFormat::Png)
            .into_diagnostic()?
            .to_rgb8();
        let (width, height) = dimensions(rgb.width(), rgb.height())?;
        return Ok(CmImage::from_rgb8(width, height, rgb.as_raw())?);
    }

    let size = reader
        .output_buffer_size()
        .ok_or(miette!("png frame does not fit in memory"))?;
    let mut buffer = vec![0; size];
    let frame = reader.next_frame(&mut buffer).into_diagnostic()?;
    buffer.truncate(frame.buffer_size());

    let palette = reader
        .info()
        .palette
        .as_deref()
        .ok_or(miette!("palette png has no PLTE chunk"))?
        .chunks_exact(3)
        .map(|rgb| [rgb[0], rgb[1], rgb[2]])
        .collect::<Vec<_>>();
    debug!(colors = palette.len(), depth = ?frame.bit_depth, "keeping png palette");

    let (width, height) = dimensions(frame.width, frame.height)?;
    let indices = unpack_indices(&buffer, frame.line_size, width as usize, frame.bit_depth);

    Ok(CmImage::from_indexed(width, height, &palette, &indices)?)
}

impl FromPngArgs {
    fn convert(&self, path: &Path) -> Result<PathBuf> {
        let data = std::fs::read(path)
            .into_diagnostic()
            .context(format!("reading {}", path.display()))?;
        let image = cm_from_png(&data).context(format!("decoding {}", path.display()))?;

        let target = output_path(&self.output, path, "cm")?;
        let mut out = File::create(&target)
            .into_diagnostic()
            .context(format!("creating {}", target.display()))?;
        image
            .write(&mut out, CmWriterOptions::default())
            .context(format!("writing {}", target.display()))?;

        Ok(target)
    }

    pub fn handle(&self) -> Result<()> {
        let files = files_with_extension(&self.input, "png")?;
        std::fs::create_dir_all(&self.output)
            .into_diagnostic()
            .context(format!("creating {}", &self.output.display()))?;

        let mut converted = 0;
        for file in &files {
            match self.convert(file) {
                Ok(target) => {
                    info!("wrote {}", target.display());
                    converted += 1;
                }
                Err(report) => warn!("skipping {}: {report:?}", file.display()),
            }
        }

        info!("converted {converted} of {} files", files.len());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use miette::{IntoDiagnostic, Result};
    use png::{BitDepth, ColorType};
    use pretty_assertions::assert_eq;

    use super::cm_from_png;

    fn encode_png(
        width: u32,
        height: u32,
        color: ColorType,
        depth: BitDepth,
        palette: Option<Vec<u8>>,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        if let Some(palette) = palette {
            encoder.set_palette(palette);
        }

        let mut writer = encoder.write_header().into_diagnostic()?;
        writer.write_image_data(data).into_diagnostic()?;
        writer.finish().into_diagnostic()?;

        Ok(out)
    }

    #[test]
    fn palette_png_stays_indexed() -> Result<()> {
        #[rustfmt::skip]
        let palette = vec![
            0x10, 0x20, 0x30,
            0x40, 0x50, 0x60,
        ];
        let data = encode_png(2, 2, ColorType::Indexed, BitDepth::Eight, Some(palette), &[0, 1, 1, 1])?;

        let image = cm_from_png(&data)?;
        assert_eq!(image.bpp(), 8);
        assert_eq!(
            image.palette(),
            Some(&[[0x10, 0x20, 0x30], [0x40, 0x50, 0x60]][..])
        );
        // bottom row first
        assert_eq!(image.pixels(), &[1, 1, 0, 1]);

        Ok(())
    }

    #[test]
    fn packed_palette_indices_are_spread() -> Result<()> {
        let palette = vec![0; 3 * 16];
        // 3 pixels of 4 bits: 0x1, 0x2, 0xF
        let data = encode_png(3, 1, ColorType::Indexed, BitDepth::Four, Some(palette), &[0x12, 0xF0])?;

        let image = cm_from_png(&data)?;
        assert_eq!(image.bpp(), 8);
        assert_eq!(image.header().colors, 16);
        assert_eq!(image.pixels(), &[0x1, 0x2, 0xF]);

        Ok(())
    }

    #[test]
    fn rgb_png_becomes_true_color() -> Result<()> {
        let data = encode_png(1, 1, ColorType::Rgb, BitDepth::Eight, None, &[0xAA, 0xBB, 0xCC])?;

        let image = cm_from_png(&data)?;
        assert_eq!(image.bpp(), 24);
        assert_eq!(image.palette(), None);
        assert_eq!(image.pixels(), &[0xCC, 0xBB, 0xAA]);

        Ok(())
    }
}
