//! DOF Config Pull Utility
//!
//! Keeps the VPinballX DOF config directory in step with the config tool
//! service. Exits 0 when the config is installed or already current, 1 on any
//! fatal error.

mod cli;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::Parser;
use dofconfig_core::paths::default_config_dir;
use dofconfig_core::remote::ConfigToolClient;
use dofconfig_core::sync::{SyncEvent, SyncOrchestrator, SyncOutcome, SyncSettings, SyncStage};

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("** Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let destination = match &args.target {
        Some(target) => target.clone(),
        None => default_config_dir().map_err(|e| anyhow!("No default destination path: {e}"))?,
    };

    let settings = SyncSettings::new(destination)
        .with_api_key(args.api_key.clone())
        .with_save_file(args.save_file.clone())
        .with_overwrite(args.overwrite_mode())
        .with_force(args.force);

    let log_file = args.log.then(|| log_file_path(&settings));
    logging::init(args.verbose, args.debug, log_file.as_deref())?;

    if args.verbose {
        println!("**** DOF Config Tool Pull Utility (v{})", dofconfig_core::VERSION);
        println!();
    }

    if args.debug {
        println!("** Debug Parameters");
        println!("apikey = {}", mask(&args.api_key));
        println!("savefile = {}", args.save_file);
        println!("target = {}", settings.destination().display());
        println!("versionfile = {}", settings.version_store().path().display());
        println!("endpoint = {}", args.endpoint);
        println!("overwrite = {:?}", settings.overwrite);
    }

    let client = ConfigToolClient::new(&args.endpoint)?;

    let chatty = args.chatty();
    let outcome = SyncOrchestrator::new(&client, settings)
        .with_observer(move |event| progress(chatty, event))
        .run()?;
    tracing::debug!(?outcome, "Sync finished");

    report(chatty, &outcome);
    Ok(())
}

/// Print stage banners and recoverable problems as the run goes
fn progress(chatty: bool, event: &SyncEvent) {
    match event {
        SyncEvent::LocalVersion(None) => {
            eprintln!("** Warning: Version not found in ini file. Updating regardless.");
        }
        SyncEvent::RecordUnavailable(reason) => eprintln!("** Warning: {reason}"),
        _ if !chatty => {}
        SyncEvent::Stage(SyncStage::QueryRemoteVersion) => {
            println!("**** Requesting Online Version ****");
        }
        SyncEvent::Stage(SyncStage::LoadLocalVersion) => println!("**** Checking INI Version ****"),
        SyncEvent::RemoteVersion(version) => println!("Online Version = {version}"),
        SyncEvent::LocalVersion(Some(version)) => println!("INI Version = {version}"),
        SyncEvent::Downloading => println!("**** Requesting File ****"),
        SyncEvent::Extracting {
            archive,
            destination,
        } => {
            println!("**** Extracting Files ****");
            println!("From: {}", archive.display());
            println!("To: {}", destination.display());
        }
        SyncEvent::Stage(_) => {}
    }
}

/// Print the user-facing result of a run
fn report(chatty: bool, outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Updated { summary, .. } => {
            if summary.files_skipped > 0 {
                eprintln!(
                    "** Warning: Kept {} existing file(s) unchanged.",
                    summary.files_skipped
                );
            }
        }
        SyncOutcome::Current { .. } => println!("** {outcome}"),
        SyncOutcome::LocalNewer { .. } => eprintln!("** Warning: {outcome}"),
    }

    if chatty {
        println!("**** Done, {outcome} ****");
    }
}

fn log_file_path(settings: &SyncSettings) -> PathBuf {
    let store = settings.version_store();
    store
        .path()
        .parent()
        .map(|dir| dir.join(logging::LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(logging::LOG_FILE_NAME))
}

/// Show enough of the key to recognise it
fn mask(key: &str) -> String {
    match key.chars().count() {
        0 => "(none)".to_string(),
        n if n <= 4 => "*".repeat(n),
        n => {
            let tail: String = key.chars().skip(n - 4).collect();
            format!("{}{tail}", "*".repeat(n - 4))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask(""), "(none)");
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("abcdef12"), "****ef12");
    }

    #[test]
    fn test_log_file_beside_record() {
        let settings = SyncSettings::new("/cab/10.8/directoutputconfig");
        assert_eq!(
            log_file_path(&settings),
            PathBuf::from("/cab/10.8").join(logging::LOG_FILE_NAME)
        );
    }
}
