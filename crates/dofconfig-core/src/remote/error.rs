//! Errors for the config tool service

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the config tool service
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Server returned an invalid version: '{0}'")]
    InvalidVersion(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that can occur while downloading a config bundle
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Could not create download file in {}: {source}", dir.display())]
    TempFile {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Archive missing after download: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Archive not downloaded correctly: {size} bytes, expected at least {minimum}")]
    TooSmall { size: u64, minimum: u64 },
}
