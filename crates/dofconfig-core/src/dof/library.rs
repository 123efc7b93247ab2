//! Loading the libdof C bridge

use std::env;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use libloading::Library;

use super::config::{log_trampoline, register_sink, DofConfig};
use super::error::DofError;
use super::ffi::DofApi;
use super::handle::Dof;
use crate::paths::with_trailing_separator;

/// Environment variable naming the library to load
pub const LIBRARY_PATH_ENV: &str = "DOF_LIBRARY_PATH";

/// Base name of the C bridge library (`libdof_python.so`, `dof_python.dll`, ...)
pub const LIBRARY_NAME: &str = "dof_python";

/// The loaded libdof C bridge
pub struct DofLibrary {
    api: DofApi,
    path: PathBuf,
    owns_log_callback: bool,
    // Must outlive every pointer in `api`; `None` only for in-process tables
    _library: Option<Library>,
}

impl DofLibrary {
    /// Load the library at `path` and apply `config`
    pub fn load(path: impl AsRef<Path>, config: DofConfig) -> Result<Self, DofError> {
        let path = path.as_ref();

        // SAFETY: loading runs the library's initialisers; libdof has no
        // load-time side effects beyond its own singletons
        let library = unsafe { Library::new(path) }.map_err(|e| DofError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // SAFETY: the declared signatures match dof_c_api.h
        let api = unsafe { DofApi::resolve(&library)? };

        let mut lib = DofLibrary {
            api,
            path: path.to_path_buf(),
            owns_log_callback: false,
            _library: Some(library),
        };
        lib.apply(config)?;

        tracing::info!(path = %lib.path.display(), "libdof loaded");
        Ok(lib)
    }

    /// Find the library in the usual places and load it.
    ///
    /// Looks at `DOF_LIBRARY_PATH`, then next to the executable, then in the
    /// working directory.
    pub fn load_default(config: DofConfig) -> Result<Self, DofError> {
        let searched = candidate_paths();
        match searched.iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path, config),
            None => Err(DofError::NotFound { searched }),
        }
    }

    /// Where the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a DOF instance
    pub fn create(&self) -> Result<Dof<'_>, DofError> {
        // SAFETY: no preconditions
        let raw = unsafe { (self.api.create)() };
        let handle = NonNull::new(raw).ok_or(DofError::CreateFailed)?;
        Ok(Dof::new(self, handle))
    }

    /// Wrap a function table that lives in this process
    #[cfg(test)]
    pub(crate) fn from_api(api: DofApi) -> Self {
        DofLibrary {
            api,
            path: PathBuf::from("<in-process>"),
            owns_log_callback: false,
            _library: None,
        }
    }

    pub(crate) fn api(&self) -> &DofApi {
        &self.api
    }

    fn apply(&mut self, mut config: DofConfig) -> Result<(), DofError> {
        if let Some(sink) = config.take_log_sink() {
            register_sink(sink)?;
            // SAFETY: the trampoline is a plain function that lives for the whole process
            unsafe { (self.api.set_log_callback)(Some(log_trampoline)) };
            self.owns_log_callback = true;
        }

        if let Some(level) = config.log_level() {
            // SAFETY: the value is one of the DofLogLevel constants
            unsafe { (self.api.set_log_level)(level.as_raw()) };
        }

        if let Some(base) = config.base_path() {
            let base = base.to_str().ok_or_else(|| DofError::InvalidString {
                field: "base path",
                reason: "not valid UTF-8".to_string(),
            })?;
            let base = c_string("base path", &with_trailing_separator(base))?;
            // SAFETY: libdof copies the string
            unsafe { (self.api.set_base_path)(base.as_ptr()) };
        }

        Ok(())
    }
}

impl Drop for DofLibrary {
    fn drop(&mut self) {
        if self.owns_log_callback {
            // SAFETY: disables the callback before the library is unloaded
            unsafe { (self.api.set_log_callback)(None) };
        }
    }
}

impl std::fmt::Debug for DofLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DofLibrary").field("path", &self.path).finish()
    }
}

/// Convert a Rust string for the C API
pub(crate) fn c_string(field: &'static str, value: &str) -> Result<CString, DofError> {
    CString::new(value).map_err(|e| DofError::InvalidString {
        field,
        reason: e.to_string(),
    })
}

fn candidate_paths() -> Vec<PathBuf> {
    let file_name = libloading::library_filename(LIBRARY_NAME);
    let mut paths = Vec::new();

    if let Some(path) = env::var_os(LIBRARY_PATH_ENV) {
        paths.push(PathBuf::from(path));
    }
    if let Some(dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        paths.push(dir.join(&file_name));
    }
    paths.push(PathBuf::from(".").join(&file_name));

    paths
}
