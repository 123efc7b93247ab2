//! Installed Config Version Record
//!
//! The version of the last successfully installed config bundle lives in a
//! small INI file next to the config directory:
//!
//! ```text
//! [version]
//! version=42
//! ```
//!
//! Reading is forgiving: a missing file, missing key or garbage value reads
//! as "no version" so the caller treats the local tree as older than anything
//! the service can offer. Writing replaces the whole file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// File name of the version record
pub const VERSION_FILE_NAME: &str = "dofconfigversion.ini";

/// Section and key holding the installed version
const VERSION_SECTION: &str = "version";
const VERSION_KEY: &str = "version";

/// Errors that can occur while creating or writing the version record
#[derive(Error, Debug)]
pub enum VersionStoreError {
    #[error("Could not write version record [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VersionStoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        VersionStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Persisted record of the installed config version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    /// Use the record at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The record that belongs to a config directory.
    ///
    /// It sits in the parent of the config directory, so a tree at
    /// `.../10.8/directoutputconfig` is tracked by `.../10.8/dofconfigversion.ini`.
    pub fn for_destination(config_dir: &Path) -> Self {
        let parent = config_dir.parent().unwrap_or(config_dir);
        Self::new(parent.join(VERSION_FILE_NAME))
    }

    /// Path of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the record with version 0 if it does not exist yet
    pub fn ensure(&self) -> Result<(), VersionStoreError> {
        if self.path.exists() {
            return Ok(());
        }

        tracing::debug!(path = %self.path.display(), "Creating version record");
        self.write(0)
    }

    /// Read the installed version.
    ///
    /// Returns `None` when the file is missing or holds no usable version.
    pub fn read(&self) -> Option<u64> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Version record unreadable: {e}");
                return None;
            }
        };

        // Records written by older tools may not be UTF-8
        let content = String::from_utf8_lossy(&bytes);

        let raw = match find_value(&content, VERSION_SECTION, VERSION_KEY) {
            Some(raw) => raw,
            None => {
                tracing::warn!(path = %self.path.display(), "Version not found in record");
                return None;
            }
        };

        match parse_version(raw) {
            Some(version) => Some(version),
            None => {
                tracing::warn!(
                    path = %self.path.display(),
                    value = raw,
                    "Version in record is not a number"
                );
                None
            }
        }
    }

    /// Replace the record with a single section holding `version`
    pub fn write(&self, version: u64) -> Result<(), VersionStoreError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| VersionStoreError::io(dir, e))?;

        // Write beside the target and rename so a crash never leaves half a record
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| VersionStoreError::io(dir, e))?;
        temp.write_all(render(version).as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| VersionStoreError::io(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| VersionStoreError::io(&self.path, e.error))?;

        Ok(())
    }
}

/// Render the record contents for a version
fn render(version: u64) -> String {
    format!("[{VERSION_SECTION}]\n{VERSION_KEY}={version}\n")
}

/// Find `key` inside `[section]`, matching both names case-insensitively.
///
/// The search stops at the next section header. Only the first matching key
/// counts.
fn find_value<'a>(content: &'a str, section: &str, key: &str) -> Option<&'a str> {
    let mut in_section = false;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with('[') {
            if in_section {
                break;
            }
            in_section = line
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .is_some_and(|name| name.eq_ignore_ascii_case(section));
            continue;
        }

        if !in_section {
            continue;
        }

        if let Some((k, v)) = line.split_once('=') {
            if k.trim().eq_ignore_ascii_case(key) {
                return Some(v.trim());
            }
        }
    }

    None
}

/// Parse a non-negative decimal version
pub(crate) fn parse_version(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
