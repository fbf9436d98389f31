use clap::Args;
use itertools::Itertools;
use mai_arc::ArcArchive;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let arc = ArcArchive::open(&self.file).context(format!("path: {}", &self.file.display()))?;

        println!(
            "{}: {} entries, {} bytes",
            self.file.display().bold(),
            arc.len(),
            arc.file_size()
        );

        for (directory, entries) in &arc.entries().iter().chunk_by(|e| e.directory.clone()) {
            let indent = if directory.is_empty() {
                ""
            } else {
                println!("{}", format!("{directory}/").blue());
                "  "
            };

            for entry in entries {
                println!(
                    "{indent}{:<20} {:<8} {:#010x} {:>10}",
                    entry.file_name(),
                    entry.file_type.tag(),
                    entry.offset,
                    entry.size
                );
            }
        }

        Ok(())
    }
}
