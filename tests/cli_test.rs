//! End-to-end runs of the `rates-export` binary
#![cfg(feature = "cli")]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Config pointing at a port nothing listens on, so every call fails fast
fn write_offline_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    fs::write(
        &path,
        "api_base_url = \"http://127.0.0.1:9\"\nrequest_timeout_secs = 5\n",
    )
    .unwrap();
    path
}

fn rates_export(dir: &Path, args: &[&str]) -> Output {
    let config = write_offline_config(dir);
    Command::new(env!("CARGO_BIN_EXE_rates-export"))
        .args(args)
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(dir.join("out"))
        .arg("--log-file")
        .arg(dir.join("run.log"))
        .arg("--quiet")
        .output()
        .unwrap()
}

#[test]
fn test_unreachable_upstream_still_saves_blank_rows() {
    let dir = tempfile::tempdir().unwrap();

    let output = rates_export(
        dir.path(),
        &["usd", "2025-01-02", "2025-01-01", "--format", "csv"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rates_USD_2025-01-01_2025-01-02.csv saved OK!"));

    let csv = fs::read_to_string(dir.path().join("out/rates_USD_2025-01-01_2025-01-02.csv")).unwrap();
    assert_eq!(csv, "Date,USD\n2025-01-01,\n2025-01-02,\n");

    let log = fs::read_to_string(dir.path().join("run.log")).unwrap();
    assert!(log.contains("request received"));
}

#[test]
fn test_invalid_input_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = rates_export(dir.path(), &["usd", "2025-01-01", "02.01.2025"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("Invalid date"));
}
