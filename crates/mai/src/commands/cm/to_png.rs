use clap::Args;
use image::{ImageBuffer, ImageFormat, RgbImage};
use mai_cm::CmImage;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{files_with_extension, output_path};

#[derive(Args)]
pub struct ToPngArgs {
    /// A directory containing CM images
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,
}

impl ToPngArgs {
    fn convert(&self, path: &Path) -> Result<PathBuf> {
        let data = std::fs::read(path)
            .into_diagnostic()
            .context(format!("reading {}", path.display()))?;
        let image = CmImage::from_bytes(&data)?;

        let (width, height) = (image.width() as u32, image.height() as u32);
        let png: RgbImage = ImageBuffer::from_raw(width, height, image.to_rgb8()?)
            .ok_or(miette!("pixel data does not match {width}x{height}"))?;

        let target = output_path(&self.output, path, "png")?;
        png.save_with_format(&target, ImageFormat::Png)
            .into_diagnostic()
            .context(format!("writing {}", target.display()))?;

        Ok(target)
    }

    pub fn handle(&self) -> Result<()> {
        let files = files_with_extension(&self.input, "cm")?;
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
