//! Smoke tests for the storeprobe CLI

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the storeprobe binary with no configuration leaking in
fn storeprobe() -> Command {
    let mut cmd = Command::cargo_bin("storeprobe").expect("storeprobe binary should exist");
    for key in [
        "STOREPROBE_CONFIG",
        "STOREPROBE_BASE_URL",
        "BASE_URL",
        "STOREPROBE_STORAGE_PREFIX",
        "CI",
        "CHROMIUM_PATH",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    storeprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    storeprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_shows_help() {
    storeprobe().assert().failure(); // Requires a subcommand
}

// ============================================================================
// Subcommand Help Tests
// ============================================================================

#[test]
fn test_run_subcommand_help() {
    storeprobe()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run scenarios"))
        .stdout(predicate::str::contains("--offline"))
        .stdout(predicate::str::contains("--fail-fast"));
}

#[test]
fn test_list_subcommand_help() {
    storeprobe()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--suite"));
}

// ============================================================================
// List Command Tests
// ============================================================================

#[test]
fn test_list_all() {
    storeprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("home_title"))
        .stdout(predicate::str::contains("orders_success_banner"))
        .stdout(predicate::str::contains("login_repeated_failures"));
}

#[test]
fn test_list_one_suite() {
    storeprobe()
        .args(["list", "--suite", "cart"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cart_checkout_opens_payment"))
        .stdout(predicate::str::contains("home_title").not());
}

#[test]
fn test_list_unknown_suite_fails() {
    storeprobe()
        .args(["list", "--suite", "wishlist"])
        .assert()
        .failure();
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    storeprobe()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url"))
        .stdout(predicate::str::contains("127.0.0.1:5501"))
        .stdout(predicate::str::contains("max_attempts: 3"));
}

#[test]
fn test_config_precedence() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("storeprobe.yaml");
    fs::write(
        &path,
        "base_url: http://file.test\nstorage_prefix: file_\nretry:\n  max_attempts: 4\n",
    )
    .unwrap();

    storeprobe()
        .env("STOREPROBE_STORAGE_PREFIX", "env_")
        .args(["config", "--config"])
        .arg(&path)
        .args(["--base-url", "http://flag.test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flag.test"))
        .stdout(predicate::str::contains("env_"))
        .stdout(predicate::str::contains("max_attempts: 4"));
}

#[test]
fn test_config_rejects_bad_base_url() {
    storeprobe()
        .args(["config", "--base-url", "shop.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_config_missing_file_fails() {
    storeprobe()
        .args(["config", "--config", "/nonexistent/storeprobe.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ============================================================================
// Run Command Tests
// ============================================================================

#[test]
fn test_offline_run_text() {
    storeprobe()
        .args(["run", "--offline", "--filter", "home_title", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS home_title"))
        .stdout(predicate::str::contains("1 passed, 0 failed"));
}

#[test]
fn test_offline_run_json() {
    let output = storeprobe()
        .args([
            "run",
            "--offline",
            "--suite",
            "login",
            "--filter",
            "password_masked",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["reports"][0]["name"], "login_password_masked");
    assert_eq!(json["reports"][0]["passed"], true);
}

#[test]
fn test_run_without_matches_fails() {
    storeprobe()
        .args(["run", "--offline", "--filter", "wishlist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No scenarios match"));
}
