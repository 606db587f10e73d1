#![allow(deprecated)] // cargo_bin! macro doesn't exist yet in assert_cmd 2.1

use assert_cmd::Command;
use predicates::prelude::*;

/// A command with no credentials from the environment.
fn panshare() -> Command {
    let mut cmd = Command::cargo_bin("panshare").unwrap();
    cmd.env_remove("PANSHARE_USER")
        .env_remove("PANSHARE_PASSWORD")
        .env_remove("PANSHARE_TOKEN")
        .env_remove("PANSHARE_API_URL");
    cmd
}

#[test]
fn test_help_lists_commands() {
    panshare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("ls"))
        .stdout(predicate::str::contains("url"));
}

#[test]
fn test_serve_defaults_in_help() {
    panshare()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0"))
        .stdout(predicate::str::contains("8123"));
}

#[test]
fn test_missing_credentials() {
    panshare()
        .args(["ls", "/"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no credentials"));
}

#[test]
fn test_user_without_password() {
    panshare()
        .args(["-u", "13800000000", "ls", "/"])
        .assert()
        .code(2);
}

#[test]
fn test_quiet_suppresses_error() {
    panshare()
        .args(["--quiet", "ls", "/"])
        .assert()
        .code(2)
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_unreachable_remote() {
    // Nothing listens on the discard port
    panshare()
        .env("PANSHARE_TOKEN", "test-token")
        .env("PANSHARE_API_URL", "http://127.0.0.1:9")
        .args(["ls", "/"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Failed to list /"));
}

#[test]
fn test_favicon_is_not_found_without_network() {
    panshare()
        .env("PANSHARE_TOKEN", "test-token")
        .env("PANSHARE_API_URL", "http://127.0.0.1:9")
        .args(["url", "/favicon.ico"])
        .assert()
        .code(3);
}

#[test]
fn test_drive_root_is_not_a_file() {
    panshare()
        .env("PANSHARE_TOKEN", "test-token")
        .env("PANSHARE_API_URL", "http://127.0.0.1:9")
        .args(["url", "/0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not a file"));
}
