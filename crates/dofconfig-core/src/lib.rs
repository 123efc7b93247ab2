//! # DOF Config Core Library
//!
//! Core functionality for keeping a DOF (DirectOutput Framework) cabinet
//! configuration current.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The installed-version record next to the config directory
//! - A client for the config tool service (version query and bundle download)
//! - ZIP bundle extraction into the config tree
//! - The sync orchestrator that ties these together
//! - A safe binding over the native libdof C bridge
//!
//! ## Example
//!
//! ```rust,ignore
//! use dofconfig_core::prelude::*;
//!
//! let settings = SyncSettings::new(default_config_dir()?).with_api_key("my-key");
//! let client = ConfigToolClient::new(DEFAULT_ENDPOINT)?;
//! let outcome = SyncOrchestrator::new(&client, settings).run()?;
//! println!("{outcome}");
//! ```

pub mod dof;
pub mod install;
pub mod paths;
pub mod remote;
pub mod sync;
pub mod version;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dof::{Dof, DofConfig, DofLibrary, ElementType, LogLevel, Session};
    pub use crate::install::{ArchiveInstaller, InstallSummary, OverwriteMode};
    pub use crate::paths::default_config_dir;
    pub use crate::remote::{
        ConfigFetcher, ConfigSource, ConfigToolClient, DownloadArtifact, DEFAULT_ENDPOINT,
    };
    pub use crate::sync::{
        decide, Decision, SyncError, SyncEvent, SyncOrchestrator, SyncOutcome, SyncSettings,
        SyncStage,
    };
    pub use crate::version::VersionStore;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
