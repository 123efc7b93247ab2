//! Native library errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or driving libdof
#[derive(Error, Debug)]
pub enum DofError {
    #[error("Could not load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("libdof not found (searched: {})", format_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("Missing symbol '{name}': {reason}")]
    MissingSymbol { name: String, reason: String },

    #[error("dof_create() returned NULL")]
    CreateFailed,

    #[error("Invalid {field}: {reason}")]
    InvalidString { field: &'static str, reason: String },

    #[error("A log sink is already registered for this process")]
    LogSinkAlreadySet,
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
