//! Sync run settings

use std::path::{Path, PathBuf};

use crate::install::OverwriteMode;
use crate::remote::DEFAULT_SAVE_FILE;
use crate::version::VersionStore;

/// Settings for one sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Config directory the bundle is extracted into
    pub destination: PathBuf,
    /// Access key for the bundle download
    pub api_key: String,
    /// Name the temporary download is derived from
    pub save_file: String,
    /// Policy for files that already exist in the destination
    pub overwrite: OverwriteMode,
    /// Download even when the installed version is current
    pub force: bool,
    /// Directory for the temporary download (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
    /// Version record location (next to the destination when unset)
    pub version_file: Option<PathBuf>,
}

impl SyncSettings {
    /// Settings for syncing into `destination` with defaults for everything else
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            api_key: String::new(),
            save_file: DEFAULT_SAVE_FILE.to_string(),
            overwrite: OverwriteMode::default(),
            force: false,
            temp_dir: None,
            version_file: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_save_file(mut self, save_file: impl Into<String>) -> Self {
        self.save_file = save_file.into();
        self
    }

    pub fn with_overwrite(mut self, overwrite: OverwriteMode) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_version_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.version_file = Some(path.into());
        self
    }

    /// Config directory the bundle is extracted into
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The version record for this run
    pub fn version_store(&self) -> VersionStore {
        match &self.version_file {
            Some(path) => VersionStore::new(path),
            None => VersionStore::for_destination(&self.destination),
        }
    }
}
