//! End-to-end tests for the dofconfig-pull binary
//!
//! The binary is pointed at a mock config tool service through `--endpoint`.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn bundle(files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.start_file("readme.txt", options).unwrap();
    zip.write_all(&[b'#'; 2048]).unwrap();
    zip.finish().unwrap().into_inner()
}

async fn service(version: ResponseTemplate, bundle_hits: u64, body: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("query", "version"))
        .respond_with(version)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("query", "getconfig"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(bundle_hits)
        .mount(&server)
        .await;
    server
}

fn pull(server: &MockServer, target: &Path, temp: &Path) -> Command {
    let mut cmd =
        Command::cargo_bin("dofconfig-pull").expect("Failed to find dofconfig-pull binary");
    cmd.env_remove("RUST_LOG")
        .env("TMPDIR", temp)
        .env("TMP", temp)
        .env("TEMP", temp)
        .arg("--endpoint")
        .arg(format!("{}/api.php", server.uri()))
        .arg("-A")
        .arg("cab-key")
        .arg("-T")
        .arg(target);
    cmd
}

struct Cabinet {
    root: TempDir,
    temp: TempDir,
}

impl Cabinet {
    fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            temp: TempDir::new().unwrap(),
        }
    }

    fn target(&self) -> std::path::PathBuf {
        self.root.path().join("10.8").join("directoutputconfig")
    }

    fn record(&self) -> std::path::PathBuf {
        self.root.path().join("10.8").join("dofconfigversion.ini")
    }
}

// The binary blocks, so the mock server needs its own worker threads
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_first_run_installs_bundle() {
    let server = service(
        ResponseTemplate::new(200).set_body_string("5\n"),
        1,
        bundle(&[("roms/afm/afm.ini", "afm")]),
    )
    .await;
    let cab = Cabinet::new();

    pull(&server, &cab.target(), cab.temp.path())
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains("**** Done, Config updated to v5 ****"));

    assert_eq!(
        fs::read_to_string(cab.target().join("roms/afm/afm.ini")).unwrap(),
        "afm"
    );
    assert_eq!(
        fs::read_to_string(cab.record()).unwrap(),
        "[version]\nversion=5\n"
    );
    assert_eq!(fs::read_dir(cab.temp.path()).unwrap().count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_current_version_skips_download() {
    let server = service(
        ResponseTemplate::new(200).set_body_string("7"),
        0,
        bundle(&[]),
    )
    .await;
    let cab = Cabinet::new();
    fs::create_dir_all(cab.target()).unwrap();
    fs::write(cab.record(), "[version]\nversion=7\n").unwrap();

    pull(&server, &cab.target(), cab.temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("** Version (7) is current."));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_version_query_failure_exits_1() {
    let server = service(ResponseTemplate::new(500), 0, bundle(&[])).await;
    let cab = Cabinet::new();

    pull(&server, &cab.target(), cab.temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("** Error: Unable to get version"));

    assert!(!cab.record().exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_version_query_failure_with_log_writes_only_log() {
    let server = service(ResponseTemplate::new(500), 0, bundle(&[])).await;
    let cab = Cabinet::new();

    pull(&server, &cab.target(), cab.temp.path())
        .arg("-L")
        .assert()
        .code(1);

    let mut entries: Vec<String> = fs::read_dir(cab.root.path().join("10.8"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["directoutputconfig", "dofconfig-pull.log"]);
    assert_eq!(fs::read_dir(cab.target()).unwrap().count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_local_newer_warns_and_succeeds() {
    let server = service(
        ResponseTemplate::new(200).set_body_string("3"),
        0,
        bundle(&[]),
    )
    .await;
    let cab = Cabinet::new();
    fs::create_dir_all(cab.target()).unwrap();
    fs::write(cab.record(), "[version]\nversion=4\n").unwrap();

    pull(&server, &cab.target(), cab.temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "** Warning: Local version (4) newer than online (3)",
        ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_force_reinstalls_and_logs() {
    let server = service(
        ResponseTemplate::new(200).set_body_string("7"),
        1,
        bundle(&[("a.ini", "fresh")]),
    )
    .await;
    let cab = Cabinet::new();
    fs::create_dir_all(cab.target()).unwrap();
    fs::write(cab.record(), "[version]\nversion=7\n").unwrap();
    fs::write(cab.target().join("a.ini"), "stale").unwrap();

    pull(&server, &cab.target(), cab.temp.path())
        .args(["--force", "-L"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(cab.target().join("a.ini")).unwrap(), "fresh");
    let log = fs::read_to_string(cab.root.path().join("10.8").join("dofconfig-pull.log")).unwrap();
    assert!(log.contains("Config updated"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_debug_alone_reports_progress_and_completion() {
    let server = service(
        ResponseTemplate::new(200).set_body_string("5"),
        1,
        bundle(&[("a.ini", "a")]),
    )
    .await;
    let cab = Cabinet::new();

    pull(&server, &cab.target(), cab.temp.path())
        .arg("-D")
        .assert()
        .success()
        .stdout(predicate::str::contains("** Debug Parameters"))
        .stdout(predicate::str::contains("Online Version = 5"))
        .stdout(predicate::str::contains("INI Version = 0"))
        .stdout(predicate::str::contains("**** Requesting File ****"))
        .stdout(predicate::str::contains("**** Extracting Files ****"))
        .stdout(predicate::str::contains("**** Done, Config updated to v5 ****"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_verbose_completion_when_current() {
    let server = service(
        ResponseTemplate::new(200).set_body_string("7"),
        0,
        bundle(&[]),
    )
    .await;
    let cab = Cabinet::new();
    fs::create_dir_all(cab.target()).unwrap();
    fs::write(cab.record(), "[version]\nversion=7\n").unwrap();

    pull(&server, &cab.target(), cab.temp.path())
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains("**** Done, Version (7) is current. ****"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_corrupt_record_warns_before_failed_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("query", "version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("5"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("query", "getconfig"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let cab = Cabinet::new();
    fs::create_dir_all(cab.target()).unwrap();
    fs::write(cab.record(), "[version]\nversion=banana\n").unwrap();

    let output = pull(&server, &cab.target(), cab.temp.path())
        .assert()
        .code(1)
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    let warning = stderr
        .find("** Warning: Version not found in ini file.")
        .expect("missing record warning");
    let error = stderr.find("** Error:").expect("missing error");
    assert!(warning < error, "stderr: {stderr}");
}

#[test]
fn test_conflicting_overwrite_flags() {
    Command::cargo_bin("dofconfig-pull")
        .expect("Failed to find dofconfig-pull binary")
        .args(["-Y", "--keep-existing"])
        .assert()
        .code(2);
}
