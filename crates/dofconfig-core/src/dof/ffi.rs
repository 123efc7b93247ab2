//! Function table of the libdof C bridge

use libc::{c_char, c_int, c_void};
use libloading::{Library, Symbol};

use super::error::DofError;

/// `DofLogCallbackC`: receives an already formatted message
pub(crate) type LogCallback = Option<unsafe extern "C" fn(level: c_int, message: *const c_char)>;

/// Entry points resolved from the loaded library.
///
/// The pointers are only valid while the `Library` they came from is loaded.
#[derive(Clone, Copy)]
pub(crate) struct DofApi {
    pub set_base_path: unsafe extern "C" fn(path: *const c_char),
    pub set_log_level: unsafe extern "C" fn(level: c_int),
    pub set_log_callback: unsafe extern "C" fn(callback: LogCallback),
    pub create: unsafe extern "C" fn() -> *mut c_void,
    pub destroy: unsafe extern "C" fn(dof: *mut c_void),
    pub init: unsafe extern "C" fn(dof: *mut c_void, table: *const c_char, rom: *const c_char),
    pub data_receive:
        unsafe extern "C" fn(dof: *mut c_void, kind: c_char, number: c_int, value: c_int),
    pub finish: unsafe extern "C" fn(dof: *mut c_void),
}

impl DofApi {
    /// Resolve every entry point.
    ///
    /// # Safety
    ///
    /// `library` must be the libdof C bridge, so the symbols have the
    /// signatures declared above.
    pub unsafe fn resolve(library: &Library) -> Result<Self, DofError> {
        Ok(Self {
            set_base_path: symbol(library, b"dof_config_set_base_path\0")?,
            set_log_level: symbol(library, b"dof_config_set_log_level\0")?,
            set_log_callback: symbol(library, b"dof_config_set_log_callback\0")?,
            create: symbol(library, b"dof_create\0")?,
            destroy: symbol(library, b"dof_destroy\0")?,
            init: symbol(library, b"dof_init\0")?,
            data_receive: symbol(library, b"dof_data_receive\0")?,
            finish: symbol(library, b"dof_finish\0")?,
        })
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &[u8]) -> Result<T, DofError> {
    let sym: Symbol<'_, T> = library.get(name).map_err(|e| DofError::MissingSymbol {
        name: String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)).into_owned(),
        reason: e.to_string(),
    })?;
    Ok(*sym)
}
