//! Sync orchestration
//!
//! One run walks these stages:
//!
//! ```text
//! CheckTargetDir → QueryRemoteVersion → LoadLocalVersion → Decide
//!     → DownloadAndInstall → PersistVersion → Done
//!     → Skip → Done
//! ```
//!
//! The remote version is always queried, even for forced updates, because it
//! becomes the new version record once the bundle is installed. The record is
//! written only after a complete extraction.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use super::error::SyncError;
use super::settings::SyncSettings;
use crate::install::{ArchiveInstaller, InstallSummary};
use crate::remote::{ConfigFetcher, ConfigSource};

/// Stages of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    CheckTargetDir,
    QueryRemoteVersion,
    LoadLocalVersion,
    Decide,
    DownloadAndInstall,
    Skip,
    PersistVersion,
    Done,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::CheckTargetDir => "check target dir",
            SyncStage::QueryRemoteVersion => "query remote version",
            SyncStage::LoadLocalVersion => "load local version",
            SyncStage::Decide => "decide",
            SyncStage::DownloadAndInstall => "download and install",
            SyncStage::Skip => "skip",
            SyncStage::PersistVersion => "persist version",
            SyncStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why a bundle is being installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// Update was forced regardless of versions
    Forced,
    /// No usable local version was recorded
    NoLocalVersion,
    /// The service offers a newer version
    Newer,
}

/// Result of the version gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Fetch and install the bundle
    Download(UpdateReason),
    /// Installed version matches the service
    Current,
    /// Installed version is ahead of the service
    LocalNewer,
}

impl Decision {
    /// Whether this decision fetches a bundle
    pub fn downloads(&self) -> bool {
        matches!(self, Decision::Download(_))
    }
}

/// The version gate.
///
/// A missing local version counts as older than every remote version.
pub fn decide(remote: u64, local: Option<u64>, force: bool) -> Decision {
    if force {
        return Decision::Download(UpdateReason::Forced);
    }

    match local {
        None => Decision::Download(UpdateReason::NoLocalVersion),
        Some(local) if remote > local => Decision::Download(UpdateReason::Newer),
        Some(local) if remote < local => Decision::LocalNewer,
        Some(_) => Decision::Current,
    }
}

/// How a sync run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A bundle was installed and recorded
    Updated {
        previous: Option<u64>,
        installed: u64,
        reason: UpdateReason,
        summary: InstallSummary,
    },
    /// Nothing to do
    Current { version: u64 },
    /// Local record is ahead of the service; nothing installed
    LocalNewer { local: u64, remote: u64 },
}

impl SyncOutcome {
    /// Whether a bundle was installed
    pub fn updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Updated { installed, .. } => {
                write!(f, "Config updated to v{installed}")
            }
            SyncOutcome::Current { version } => write!(f, "Version ({version}) is current."),
            SyncOutcome::LocalNewer { local, remote } => {
                write!(f, "Local version ({local}) newer than online ({remote})")
            }
        }
    }
}

/// Progress reported to an observer while a run is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A stage was entered
    Stage(SyncStage),
    /// The service reported its latest version
    RemoteVersion(u64),
    /// The installed version; `None` when the record holds no usable version
    LocalVersion(Option<u64>),
    /// The version record could not be created; the run continues without it
    RecordUnavailable(String),
    /// The bundle request is about to be sent
    Downloading,
    /// The bundle arrived and is about to be unpacked
    Extracting {
        archive: PathBuf,
        destination: PathBuf,
    },
}

type Observer<'a> = Box<dyn Fn(&SyncEvent) + 'a>;

/// Drives a sync run against a [`ConfigSource`]
pub struct SyncOrchestrator<'a, S: ConfigSource + ?Sized> {
    source: &'a S,
    settings: SyncSettings,
    observer: Option<Observer<'a>>,
}

impl<'a, S: ConfigSource + ?Sized> SyncOrchestrator<'a, S> {
    /// Create an orchestrator for one configuration
    pub fn new(source: &'a S, settings: SyncSettings) -> Self {
        Self {
            source,
            settings,
            observer: None,
        }
    }

    /// Report progress and recoverable problems to `observer` as they happen
    pub fn with_observer(mut self, observer: impl Fn(&SyncEvent) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Settings in use
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Run the sync to completion
    pub fn run(&self) -> Result<SyncOutcome, SyncError> {
        let destination = self.settings.destination();

        self.enter(SyncStage::CheckTargetDir);
        if !destination.is_dir() {
            fs::create_dir_all(destination).map_err(|source| SyncError::CreateDestination {
                path: destination.to_path_buf(),
                source,
            })?;
        }

        self.enter(SyncStage::QueryRemoteVersion);
        let remote = self
            .source
            .latest_version()
            .map_err(SyncError::RemoteVersion)?;
        tracing::info!(remote, "Online version");
        self.emit(SyncEvent::RemoteVersion(remote));

        self.enter(SyncStage::LoadLocalVersion);
        let store = self.settings.version_store();
        if let Err(e) = store.ensure() {
            tracing::warn!("{e}");
            self.emit(SyncEvent::RecordUnavailable(e.to_string()));
        }
        let local = store.read();
        match local {
            Some(local) => tracing::info!(local, "Installed version"),
            None => tracing::warn!("Version not found in record, updating regardless"),
        }
        self.emit(SyncEvent::LocalVersion(local));

        self.enter(SyncStage::Decide);
        let reason = match decide(remote, local, self.settings.force) {
            Decision::Download(reason) => reason,
            Decision::Current => {
                self.enter(SyncStage::Skip);
                tracing::info!(version = remote, "Config is current");
                self.enter(SyncStage::Done);
                return Ok(SyncOutcome::Current { version: remote });
            }
            Decision::LocalNewer => {
                // `LocalNewer` is only produced when a local version exists
                let local = local.unwrap_or_default();
                self.enter(SyncStage::Skip);
                tracing::warn!(local, remote, "Local version newer than online");
                self.enter(SyncStage::Done);
                return Ok(SyncOutcome::LocalNewer { local, remote });
            }
        };

        self.enter(SyncStage::DownloadAndInstall);
        let summary = self.download_and_install()?;

        self.enter(SyncStage::PersistVersion);
        store.write(remote).map_err(SyncError::PersistVersion)?;

        self.enter(SyncStage::Done);
        tracing::info!(
            version = remote,
            files = summary.files_written,
            skipped = summary.files_skipped,
            "Config updated"
        );

        Ok(SyncOutcome::Updated {
            previous: local,
            installed: remote,
            reason,
            summary,
        })
    }

    /// Download the bundle and extract it, removing the download either way
    fn download_and_install(&self) -> Result<InstallSummary, SyncError> {
        self.emit(SyncEvent::Downloading);
        let artifact = ConfigFetcher::new(self.source)
            .with_save_file(self.settings.save_file.clone())
            .with_temp_dir(self.settings.temp_dir.clone())
            .download(&self.settings.api_key)
            .map_err(SyncError::Download)?;

        self.emit(SyncEvent::Extracting {
            archive: artifact.path().to_path_buf(),
            destination: self.settings.destination().to_path_buf(),
        });
        let result = ArchiveInstaller::new(self.settings.overwrite)
            .extract(artifact.path(), self.settings.destination())
            .map_err(SyncError::Install);

        let path = artifact.path().to_path_buf();
        if let Err(e) = artifact.close() {
            tracing::warn!(path = %path.display(), "Could not remove download: {e}");
        }

        result
    }

    fn enter(&self, stage: SyncStage) {
        tracing::debug!(%stage, "Sync stage");
        self.emit(SyncEvent::Stage(stage));
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }
}
