//! Sync errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::install::ArchiveError;
use crate::remote::{FetchError, RemoteError};
use crate::version::VersionStoreError;

/// Fatal errors that end a sync run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Could not create destination path [{}]: {source}", path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to get version: {0}")]
    RemoteVersion(#[source] RemoteError),

    #[error("Unable to download: {0}")]
    Download(#[source] FetchError),

    #[error("Unable to install config: {0}")]
    Install(#[source] ArchiveError),

    #[error("Unable to record installed version: {0}")]
    PersistVersion(#[source] VersionStoreError),
}
