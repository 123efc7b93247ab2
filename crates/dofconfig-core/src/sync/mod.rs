//! Config Sync
//!
//! Brings the local config tree up to the version published by the config
//! tool service.
//!
//! ## Layout
//!
//! ```text
//! VPinballX/10.8/
//! ├── dofconfigversion.ini    # Installed bundle version
//! └── directoutputconfig/     # Extracted bundle contents
//! ```

mod error;
mod orchestrator;
mod settings;

pub use error::SyncError;
pub use orchestrator::{
    decide, Decision, SyncEvent, SyncOrchestrator, SyncOutcome, SyncStage, UpdateReason,
};
pub use settings::SyncSettings;
