//! libdof Binding
//!
//! Safe wrapper over the libdof C bridge (`dof_c_api.h`), which drives the
//! cabinet's solenoids, lamps and switches. The output engine itself is a
//! black box; this module only loads it, configures it and feeds it events.
//!
//! ## Usage
//!
//! ```ignore
//! let lib = DofLibrary::load_default(
//!     DofConfig::new()
//!         .with_base_path(home.join(".vpinball"))
//!         .with_log_level(LogLevel::Debug)
//!         .with_tracing_sink(),
//! )?;
//!
//! let mut dof = lib.create()?;
//! let mut session = dof.init("afm", None)?;
//! session.data_receive(ElementType::Solenoid, 27, 1);
//! session.data_receive(ElementType::Solenoid, 27, 0);
//! // finish on drop, then destroy when `dof` drops
//! ```
//!
//! Configuration is process-wide in libdof, so it is applied once, when the
//! library is loaded, and only one log sink may ever be registered.

mod config;
mod error;
mod ffi;
mod handle;
mod library;

pub use config::{DofConfig, LogLevel, LogSink};
pub use error::DofError;
pub use handle::{Dof, ElementType, Session};
pub use library::{DofLibrary, LIBRARY_NAME, LIBRARY_PATH_ENV};
