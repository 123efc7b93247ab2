//! Config bundle download into a temporary artifact

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use super::client::ConfigSource;
use super::error::FetchError;

/// Smallest body accepted as a bundle; anything shorter is an error page or empty reply
pub const MIN_ARCHIVE_SIZE: u64 = 1024;

/// Default save-file name, used to name the temporary download
pub const DEFAULT_SAVE_FILE: &str = "directoutputconfig.zip";

/// A downloaded bundle on disk.
///
/// The file is deleted when the artifact is dropped, whichever way the
/// surrounding operation ends.
#[derive(Debug)]
pub struct DownloadArtifact {
    file: NamedTempFile,
    size: u64,
}

impl DownloadArtifact {
    /// Location of the downloaded archive
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Size of the archive in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Delete the artifact now, reporting any failure
    pub fn close(self) -> io::Result<()> {
        self.file.close()
    }
}

/// Downloads config bundles from a [`ConfigSource`]
pub struct ConfigFetcher<'a, S: ConfigSource + ?Sized> {
    source: &'a S,
    save_file: String,
    temp_dir: Option<PathBuf>,
}

impl<'a, S: ConfigSource + ?Sized> ConfigFetcher<'a, S> {
    /// Create a fetcher that downloads into the system temp directory
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            save_file: DEFAULT_SAVE_FILE.to_string(),
            temp_dir: None,
        }
    }

    /// Name the temporary download after `save_file` (`name.zip` → `name_XXXXXX.zip`)
    pub fn with_save_file(mut self, save_file: impl Into<String>) -> Self {
        self.save_file = save_file.into();
        self
    }

    /// Download into `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Download the bundle for `api_key` and validate it
    pub fn download(&self, api_key: &str) -> Result<DownloadArtifact, FetchError> {
        let mut file = self.create_temp()?;
        tracing::debug!(path = %file.path().display(), "Downloading config bundle");

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            self.source.fetch_bundle(api_key, &mut writer)?;
            writer
                .flush()
                .map_err(|e| FetchError::Remote(e.into()))?;
        }

        let size = match fs::metadata(file.path()) {
            Ok(meta) => meta.len(),
            Err(_) => {
                return Err(FetchError::Missing {
                    path: file.path().to_path_buf(),
                })
            }
        };

        if size < MIN_ARCHIVE_SIZE {
            return Err(FetchError::TooSmall {
                size,
                minimum: MIN_ARCHIVE_SIZE,
            });
        }

        tracing::debug!(size, "Config bundle downloaded");
        Ok(DownloadArtifact { file, size })
    }

    fn create_temp(&self) -> Result<NamedTempFile, FetchError> {
        let (prefix, suffix) = temp_name_parts(&self.save_file);
        let dir = self.temp_dir.clone().unwrap_or_else(std::env::temp_dir);

        Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&dir)
            .map_err(|source| FetchError::TempFile { dir, source })
    }
}

/// Split a save-file name into a temp-file prefix and suffix
fn temp_name_parts(save_file: &str) -> (String, String) {
    let name = Path::new(save_file)
        .file_name()
        .map(Path::new)
        .unwrap_or_else(|| Path::new(DEFAULT_SAVE_FILE));

    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "dofconfig".to_string());
    let suffix = name
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| ".zip".to_string());

    (format!("{stem}_"), suffix)
}
