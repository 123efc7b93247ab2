//! Config bundle installation
//!
//! Unpacks a ZIP bundle over the config tree. Directories are created as
//! needed and files are written in full. A failure partway through leaves the
//! files extracted so far in place; the version record is only advanced by the
//! caller after a complete extraction, so the next run installs again.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

/// Errors that can occur while extracting a bundle
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Could not open archive {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid archive: {0}")]
    Zip(#[from] ZipError),

    #[error("Archive entry '{0}' points outside the destination")]
    UnsafeEntry(String),

    #[error("Could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What to do with files that already exist in the config tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Replace existing files with the bundle's copy
    #[default]
    Replace,
    /// Leave existing files untouched
    KeepExisting,
}

/// Counts from one extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallSummary {
    /// Directory entries created or confirmed
    pub directories: usize,
    /// Files written
    pub files_written: usize,
    /// Existing files left alone under [`OverwriteMode::KeepExisting`]
    pub files_skipped: usize,
}

/// Extracts config bundles into a destination tree
#[derive(Debug, Clone, Default)]
pub struct ArchiveInstaller {
    overwrite: OverwriteMode,
}

impl ArchiveInstaller {
    /// Create an installer with the given overwrite policy
    pub fn new(overwrite: OverwriteMode) -> Self {
        Self { overwrite }
    }

    /// The overwrite policy in effect
    pub fn overwrite_mode(&self) -> OverwriteMode {
        self.overwrite
    }

    /// Extract every entry of `archive` under `dest_root`
    pub fn extract(&self, archive: &Path, dest_root: &Path) -> Result<InstallSummary, ArchiveError> {
        let file = File::open(archive).map_err(|source| ArchiveError::Open {
            path: archive.to_path_buf(),
            source,
        })?;
        let mut zip = ZipArchive::new(BufReader::new(file))?;
        let mut summary = InstallSummary::default();

        tracing::debug!(
            from = %archive.display(),
            to = %dest_root.display(),
            entries = zip.len(),
            "Extracting config bundle"
        );

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            let relative = entry
                .enclosed_name()
                .ok_or_else(|| ArchiveError::UnsafeEntry(entry.name().to_string()))?;
            let dest = dest_root.join(relative);

            if entry.is_dir() {
                create_dir(&dest)?;
                summary.directories += 1;
                continue;
            }

            if let Some(parent) = dest.parent() {
                create_dir(parent)?;
            }

            if self.overwrite == OverwriteMode::KeepExisting && dest.exists() {
                tracing::debug!(path = %dest.display(), "Keeping existing file");
                summary.files_skipped += 1;
                continue;
            }

            let write_err = |source| ArchiveError::Write {
                path: dest.clone(),
                source,
            };
            let out = File::create(&dest).map_err(write_err)?;
            let mut out = BufWriter::new(out);
            io::copy(&mut entry, &mut out).map_err(write_err)?;
            out.flush().map_err(write_err)?;
            summary.files_written += 1;
        }

        Ok(summary)
    }
}

fn create_dir(path: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(path).map_err(|source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    })
}
