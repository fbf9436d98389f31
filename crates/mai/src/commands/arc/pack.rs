use clap::Args;
use mai_arc::error::Error;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{fs::File, io::Write, path::PathBuf};
use tracing::info;

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        let data = match mai_arc::build_from_directory(&self.directory) {
            Err(Error::EntryCount(0)) => return Err(miette!("directory is empty")),
            result => result.context(format!("packing {}", &self.directory.display()))?,
        };

        info!("creating {}", &self.file.display());

        let mut out = if !self.overwrite {
            File::create_new(&self.file)
                .into_diagnostic()
                .context(format!("creating {}", &self.file.display()))?
        } else {
            File::create(&self.file)
                .into_diagnostic()
                .context(format!("creating {}", &self.file.display()))?
        };

        out.write_all(&data)
            .into_diagnostic()
            .context(format!("writing {}", &self.file.display()))?;

        Ok(())
    }
}
