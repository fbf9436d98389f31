use clap::Args;
use mai_arc::{ArcArchive, ExtractOptions};
use miette::{miette, Context, Result};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting existing files
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut arc =
            ArcArchive::open(&self.file).context(format!("path: {}", &self.file.display()))?;

        let report = arc
            .extract_all(
                &self.directory,
                ExtractOptions::builder().overwrite(self.overwrite).build(),
            )
            .context(format!("extracting to {}", &self.directory.display()))?;

        info!(
            "extracted {} of {} entries",
            report.extracted.len(),
            arc.len()
        );

        if !report.is_complete() {
            for failure in &report.failures {
                error!("{} (#{}): {}", failure.path, failure.index, failure.error);
            }
            return Err(miette!(
                "{} entries could not be extracted",
                report.failures.len()
            ));
        }

        Ok(())
    }
}
