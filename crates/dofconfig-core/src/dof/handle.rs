//! DOF instances and sessions

use std::ffi::CString;
use std::path::Path;
use std::ptr::NonNull;

use libc::{c_char, c_int, c_void};

use super::error::DofError;
use super::library::{c_string, DofLibrary};

/// Kind of table element an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Solenoid or coil (`S`)
    Solenoid,
    /// Lamp (`L`)
    Lamp,
    /// Switch or GI string (`W`)
    Switch,
    /// Named element, VPX style (`E`)
    Named,
    /// Any other single-byte tag
    Other(u8),
}

impl ElementType {
    /// The ASCII tag libdof expects
    pub fn tag(self) -> u8 {
        match self {
            ElementType::Solenoid => b'S',
            ElementType::Lamp => b'L',
            ElementType::Switch => b'W',
            ElementType::Named => b'E',
            ElementType::Other(tag) => tag,
        }
    }

    /// Element type for an ASCII tag
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            b'S' => ElementType::Solenoid,
            b'L' => ElementType::Lamp,
            b'W' => ElementType::Switch,
            b'E' => ElementType::Named,
            other => ElementType::Other(other),
        }
    }
}

impl TryFrom<char> for ElementType {
    type Error = DofError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        u8::try_from(c)
            .ok()
            .filter(u8::is_ascii)
            .map(ElementType::from_tag)
            .ok_or_else(|| DofError::InvalidString {
                field: "element type",
                reason: format!("'{c}' is not an ASCII tag"),
            })
    }
}

/// A DOF instance; destroyed on drop
pub struct Dof<'lib> {
    lib: &'lib DofLibrary,
    handle: NonNull<c_void>,
}

impl<'lib> Dof<'lib> {
    pub(crate) fn new(lib: &'lib DofLibrary, handle: NonNull<c_void>) -> Self {
        Self { lib, handle }
    }

    /// Start a session for `rom` (e.g. `afm`, `tna`, `ij_l7`).
    ///
    /// `table` optionally names the table file; libdof locates it otherwise.
    /// The session finishes when dropped, after which `init` may be called
    /// again for another ROM.
    pub fn init<'a>(
        &'a mut self,
        rom: &str,
        table: Option<&Path>,
    ) -> Result<Session<'a, 'lib>, DofError> {
        let rom_c = c_string("ROM name", rom)?;
        let table_c = match table {
            Some(path) => {
                let path = path.to_str().ok_or_else(|| DofError::InvalidString {
                    field: "table path",
                    reason: "not valid UTF-8".to_string(),
                })?;
                c_string("table path", path)?
            }
            None => CString::default(),
        };

        tracing::debug!(rom, "Starting DOF session");
        // SAFETY: handle is live; libdof copies both strings
        unsafe { (self.lib.api().init)(self.handle.as_ptr(), table_c.as_ptr(), rom_c.as_ptr()) };

        Ok(Session {
            dof: self,
            rom: rom.to_string(),
            finished: false,
        })
    }
}

impl Drop for Dof<'_> {
    fn drop(&mut self) {
        // SAFETY: handle came from dof_create and is destroyed exactly once
        unsafe { (self.lib.api().destroy)(self.handle.as_ptr()) };
    }
}

/// An initialised DOF session; finished on drop
pub struct Session<'a, 'lib> {
    dof: &'a mut Dof<'lib>,
    rom: String,
    finished: bool,
}

impl Session<'_, '_> {
    /// ROM this session was started for
    pub fn rom(&self) -> &str {
        &self.rom
    }

    /// Send a game event: `value` is 0 (off), 1 (on) or an analogue level
    pub fn data_receive(&mut self, element: ElementType, number: i32, value: u8) {
        // SAFETY: handle is live while the session borrows it
        unsafe {
            (self.dof.lib.api().data_receive)(
                self.dof.handle.as_ptr(),
                element.tag() as c_char,
                number as c_int,
                c_int::from(value),
            )
        };
    }

    /// End the session now (turns all outputs off)
    pub fn finish(mut self) {
        self.finish_inner();
    }

    fn finish_inner(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        tracing::debug!(rom = %self.rom, "Finishing DOF session");
        // SAFETY: handle is live while the session borrows it
        unsafe { (self.dof.lib.api().finish)(self.dof.handle.as_ptr()) };
    }
}

impl Drop for Session<'_, '_> {
    fn drop(&mut self) {
        self.finish_inner();
    }
}
