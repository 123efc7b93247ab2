//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use dofconfig_core::install::OverwriteMode;
use dofconfig_core::remote::{DEFAULT_ENDPOINT, DEFAULT_SAVE_FILE};

/// DOF Config Tool pull utility
///
/// Checks the config tool service for a newer DOF config bundle and installs
/// it into the VPinballX config directory.
#[derive(Parser, Debug)]
#[command(name = "dofconfig-pull")]
pub struct Args {
    /// Config tool API key
    #[arg(short = 'A', long = "apikey", default_value = "")]
    pub api_key: String,

    /// Save-file name; names the temporary download
    #[arg(short = 'F', long = "file", default_value = DEFAULT_SAVE_FILE)]
    pub save_file: String,

    /// Destination config directory (default: the VPinballX 10.8 directoutputconfig directory)
    #[arg(short = 'T', long = "target")]
    pub target: Option<PathBuf>,

    /// Print progress and a completion message
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Append log output to dofconfig-pull.log next to the version record
    #[arg(short = 'L', long)]
    pub log: bool,

    /// Overwrite existing config files (default)
    #[arg(short = 'Y', long)]
    pub overwrite: bool,

    /// Leave existing config files untouched
    #[arg(long, conflicts_with = "overwrite")]
    pub keep_existing: bool,

    /// Print parameters and debug output
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Download even when the installed version is current
    #[arg(long)]
    pub force: bool,

    /// Config tool API endpoint
    #[arg(long, env = "DOFCONFIG_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

impl Args {
    pub fn overwrite_mode(&self) -> OverwriteMode {
        if self.keep_existing {
            OverwriteMode::KeepExisting
        } else {
            OverwriteMode::Replace
        }
    }

    /// Whether stage banners should be printed
    pub fn chatty(&self) -> bool {
        self.verbose || self.debug
    }
}
