//! Smoke tests for the odsrc binary.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Get the odsrc binary command.
fn odsrc() -> Command {
    let mut cmd = Command::cargo_bin("odsrc").expect("failed to find odsrc binary");
    // Keep host configuration out of the tests.
    cmd.env_remove("ODOO_ENTERPRISE_TOKEN")
        .env_remove("ODSRC_CACHE_DIR");
    cmd
}

#[test]
fn help_lists_subcommands() {
    odsrc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("cache"));
}

#[test]
fn fetch_requires_a_version() {
    odsrc().arg("fetch").assert().failure();
}

#[test]
fn community_edition_needs_no_download() {
    odsrc()
        .args(["fetch", "--version", "18", "--edition", "community"])
        .assert()
        .success()
        .stdout(predicate::str::contains("odoo:18.0"));
}

#[test]
fn enterprise_without_token_fails_with_guidance() {
    let temp = TempDir::new().unwrap();
    odsrc()
        .args(["fetch", "--version", "18", "--edition", "enterprise"])
        .args(["--dest", temp.path().join("enterprise").to_str().unwrap()])
        .args(["--cache-dir", temp.path().join("cache").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("token"))
        .stderr(predicate::str::contains("Suggestions:"));
}

#[test]
fn addons_path_skips_acquisition() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("prefetched");
    fs::create_dir_all(tree.join("account_reports")).unwrap();
    fs::write(tree.join("account_reports/__manifest__.py"), b"{}").unwrap();

    odsrc()
        .args(["fetch", "--version", "18", "--edition", "enterprise"])
        .args(["--addons-path", tree.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("existing source tree"));
}

#[test]
fn missing_addons_path_is_an_error() {
    let temp = TempDir::new().unwrap();
    odsrc()
        .args(["fetch", "--version", "18"])
        .args([
            "--addons-path",
            temp.path().join("nope").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn cache_list_reports_empty_cache() {
    let temp = TempDir::new().unwrap();
    odsrc()
        .args(["cache", "list"])
        .args(["--cache-dir", temp.path().join("cache").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty"));
}

#[test]
fn cache_clear_on_empty_cache_removes_nothing() {
    let temp = TempDir::new().unwrap();
    odsrc()
        .args(["cache", "clear"])
        .args(["--cache-dir", temp.path().join("cache").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0"));
}
