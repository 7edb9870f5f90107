//! Binary-level checks that fail before any model is loaded.

use std::process::{Command, Output};

use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    let home = TempDir::new().unwrap();
    Command::new(env!("CARGO_BIN_EXE_interest-infer"))
        .args(args)
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_help_lists_commands() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("extract"));
}

#[test]
fn test_analyze_without_snapshot_fails() {
    let output = run(&["analyze", "alice", "--no-sync"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--snapshot"), "stderr: {stderr}");
}

#[test]
fn test_analyze_with_missing_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    let output = run(&[
        "analyze",
        "alice",
        "--no-sync",
        "--snapshot",
        missing.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load snapshot"), "stderr: {stderr}");
}

#[test]
fn test_extract_rejects_out_of_range_threshold() {
    let output = run(&["extract", "rust and ipfs", "--threshold", "1.5"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--threshold"), "stderr: {stderr}");
}

#[test]
fn test_invalid_config_value_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[aggregator]\nself_weight = 0.0\nfollowings_weight = 0.0\n").unwrap();
    let output = run(&[
        "--config",
        path.to_str().unwrap(),
        "analyze",
        "alice",
        "--no-sync",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid configuration"), "stderr: {stderr}");
}
