//! Tracing setup

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// File name of the optional run log
pub const LOG_FILE_NAME: &str = "dofconfig-pull.log";

/// Console filter for the given flags; `RUST_LOG` wins when set
fn console_filter(verbose: bool, debug: bool) -> EnvFilter {
    let default = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "error"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber: console on stderr, plus `log_file` when given
pub fn init(verbose: bool, debug: bool, log_file: Option<&Path>) -> Result<()> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .without_time()
        .with_filter(console_filter(verbose, debug));

    let file = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .map_err(|e| anyhow!("Could not create log directory [{}]: {e}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow!("Could not open log file [{}]: {e}", path.display()))?;

            let level = if debug { "debug" } else { "info" };
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::new(level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| anyhow!("Could not initialise logging: {e}"))
}
