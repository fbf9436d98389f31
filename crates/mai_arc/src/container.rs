//! Whole-archive operations between an archive and a directory tree.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Component, Path, PathBuf};

use bon::Builder;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::error::{CorruptReason, Error, Result};
use crate::read::{ArcArchive, ArcEntry};
use crate::write::build;

/// Options for extracting an archive into a directory
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct ExtractOptions {
    /// Replace files that already exist in the destination
    #[builder(default)]
    pub overwrite: bool,
}

/// An entry that could not be extracted
#[derive(Debug)]
pub struct ExtractFailure {
    /// Position of the entry in the archive
    pub index: usize,
    /// Logical path of the entry
    pub path: String,
    /// Why extraction failed
    pub error: Error,
}

/// Outcome of [`ArcArchive::extract_all`]
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Files written, in archive order
    pub extracted: Vec<PathBuf>,
    /// Entries that were skipped
    pub failures: Vec<ExtractFailure>,
}

impl ExtractReport {
    /// Whether every entry was extracted
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Join the entry file name onto `destination`, refusing paths that leave it.
fn destination_for(destination: &Path, entry: &ArcEntry) -> Result<PathBuf> {
    let relative = PathBuf::from(entry.file_name());
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(Error::CorruptEntry {
            index: entry.index,
            reason: CorruptReason::UnsafePath(relative),
        });
    }
    Ok(destination.join(relative))
}

impl<R: Read + Seek> ArcArchive<R> {
    /// Extract every entry to `destination/<path>.<extension>`.
    ///
    /// Entries that fail are recorded in the report and the remaining entries are
    /// still extracted. An error is only returned when `destination` cannot be created.
    #[instrument(skip(self, destination), fields(destination = %destination.as_ref().display()), err)]
    pub fn extract_all(
        &mut self,
        destination: impl AsRef<Path>,
        options: ExtractOptions,
    ) -> Result<ExtractReport> {
        let destination = destination.as_ref();
        fs::create_dir_all(destination)?;

        let mut report = ExtractReport::default();
        for index in 0..self.len() {
            match self.extract_entry(index, destination, options) {
                Ok(path) => report.extracted.push(path),
                Err(error) => {
                    let path = self.entries()[index].path.to_string();
                    warn!(index, %path, %error, "skipping entry");
                    report.failures.push(ExtractFailure { index, path, error });
                }
            }
        }

        Ok(report)
    }

    fn extract_entry(
        &mut self,
        index: usize,
        destination: &Path,
        options: ExtractOptions,
    ) -> Result<PathBuf> {
        let target = destination_for(destination, &self.entries()[index])?;
        info!("writing {}", target.display());

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = if options.overwrite {
            File::create(&target)?
        } else {
            File::create_new(&target)?
        };

        let mut file = self.by_index(index)?;
        let expected = file.size();
        let copied = io::copy(&mut file, &mut out)?;
        if copied != expected {
            return Err(Error::IOError(io::ErrorKind::UnexpectedEof.into()));
        }

        Ok(target)
    }
}

/// Entry name for a file below `root`: its relative path joined with `/`, without extension.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| Error::CustomError(e.to_string()))?
        .with_extension("");

    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| Error::InvalidEntryName(relative.display().to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(parts.join("/"))
}

/// Build a flat archive from every regular file below `source`.
///
/// Files are visited in file name order. Each entry is named after its path relative
/// to `source` with `/` separators and without its extension.
#[instrument(skip_all, fields(source = %source.as_ref().display()), err)]
pub fn build_from_directory(source: impl AsRef<Path>) -> Result<Vec<u8>> {
    let source = source.as_ref();

    let files = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect::<Vec<_>>();

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let name = entry_name(source, file.path())?;
        info!("packing {} as {name}", file.path().display());
        entries.push((name, fs::read(file.path())?));
    }

    build(entries)
}
