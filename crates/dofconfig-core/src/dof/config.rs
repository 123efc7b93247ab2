//! Process-wide libdof configuration
//!
//! libdof keeps its configuration in a singleton: one base path, one minimum
//! log level, one log callback. [`DofConfig`] collects these and is applied
//! once when the library is loaded. The log sink is a single process-wide
//! registration; it cannot be replaced after it has been set.

use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use libc::{c_char, c_int};

use super::error::DofError;

/// libdof log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info = 0,
    Warn = 1,
    Error = 2,
    Debug = 3,
}

impl LogLevel {
    /// Convert the C enum value
    pub fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            0 => Some(LogLevel::Info),
            1 => Some(LogLevel::Warn),
            2 => Some(LogLevel::Error),
            3 => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// The C enum value
    pub fn as_raw(self) -> c_int {
        self as c_int
    }

    /// Short tag for console output
    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO ",
            LogLevel::Warn => "WARN ",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Receiver for libdof log messages
pub type LogSink = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

static LOG_SINK: OnceLock<LogSink> = OnceLock::new();

/// Configuration applied to libdof before any instance is created
#[derive(Default)]
pub struct DofConfig {
    base_path: Option<PathBuf>,
    log_level: Option<LogLevel>,
    log_sink: Option<LogSink>,
}

impl DofConfig {
    /// Empty configuration (library defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory libdof searches for its config files (`~/.vpinball/` by default)
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Minimum severity libdof reports
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Receive libdof log messages
    pub fn with_log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(LogLevel, &str) + Send + Sync + 'static,
    {
        self.log_sink = Some(Box::new(sink));
        self
    }

    /// Forward libdof log messages to `tracing`
    pub fn with_tracing_sink(self) -> Self {
        self.with_log_sink(|level, message| match level {
            LogLevel::Error => tracing::error!(target: "libdof", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "libdof", "{message}"),
            LogLevel::Info => tracing::info!(target: "libdof", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "libdof", "{message}"),
        })
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    pub(crate) fn take_log_sink(&mut self) -> Option<LogSink> {
        self.log_sink.take()
    }
}

impl fmt::Debug for DofConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DofConfig")
            .field("base_path", &self.base_path)
            .field("log_level", &self.log_level)
            .field("log_sink", &self.log_sink.is_some())
            .finish()
    }
}

/// Install the process-wide sink; fails if one is already installed
pub(crate) fn register_sink(sink: LogSink) -> Result<(), DofError> {
    LOG_SINK.set(sink).map_err(|_| DofError::LogSinkAlreadySet)
}

/// C callback handed to libdof; forwards to the registered sink
pub(crate) unsafe extern "C" fn log_trampoline(level: c_int, message: *const c_char) {
    let Some(sink) = LOG_SINK.get() else {
        return;
    };

    let text = if message.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(message).to_string_lossy()
    };
    let level = LogLevel::from_raw(level).unwrap_or(LogLevel::Info);

    // Unwinding into C is undefined behaviour
    if panic::catch_unwind(AssertUnwindSafe(|| sink(level, &*text))).is_err() {
        eprintln!("[dof] log sink panicked");
    }
}
