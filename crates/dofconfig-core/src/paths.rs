//! Default locations for VPinballX DOF configuration

use std::io;
use std::path::PathBuf;

/// Directory of the VPinballX release the config tree belongs to
const VPX_RELEASE_DIR: [&str; 2] = ["VPinballX", "10.8"];

/// Name of the config directory inside the release directory
pub const CONFIG_DIR_NAME: &str = "directoutputconfig";

/// Get the platform default config directory.
///
/// - Windows: `%APPDATA%\VPinballX\10.8\directoutputconfig`
/// - macOS: `~/Library/Application Support/VPinballX/10.8/directoutputconfig`
/// - Linux: `~/.local/share/VPinballX/10.8/directoutputconfig`
pub fn default_config_dir() -> io::Result<PathBuf> {
    // `data_dir` is roaming AppData on Windows and Application Support on macOS
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not find app data directory")
        })?;

    Ok(VPX_RELEASE_DIR
        .iter()
        .fold(base, |path, part| path.join(part))
        .join(CONFIG_DIR_NAME))
}

/// Make sure a base path handed to libdof ends with a directory separator
pub fn with_trailing_separator(path: &str) -> String {
    if path.ends_with('/') || path.ends_with('\\') {
        path.to_string()
    } else {
        format!("{}{}", path, std::path::MAIN_SEPARATOR)
    }
}
