use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic, Result};
use walkdir::WalkDir;

pub mod from_png;
pub mod to_png;

#[derive(clap::Subcommand)]
pub enum CmCommands {
    /// Convert every CM image in a directory to PNG
    ToPng(to_png::ToPngArgs),
    /// Convert every PNG image in a directory to CM
    FromPng(from_png::FromPngArgs),
}

impl CmCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            CmCommands::ToPng(to_png) => to_png.handle(),
            CmCommands::FromPng(from_png) => from_png.handle(),
        }
    }
}

/// Files directly inside `directory` with the given extension, ignoring case
fn files_with_extension(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(miette::miette!("{} is not a directory", directory.display()));
    }

    let files = WalkDir::new(directory)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()
        .into_diagnostic()
        .context(format!("reading {}", directory.display()))?
        .into_iter()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect();

    Ok(files)
}

/// `output/<stem>.<extension>` for an input file
fn output_path(output: &Path, input: &Path, extension: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or(miette::miette!("unable to find file stem of {}", input.display()))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    Ok(output.join(name))
}
