//! Integration tests for the `unidash` binary.
//!
//! Argument parsing, completions, config handling and allowlist checks, all
//! without a live controller.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// `unidash` with env isolation: no inherited credentials, no real config.
fn unidash_cmd(workdir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("unidash");
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("UNIFI_USER")
        .env_remove("UNIFI_PASS")
        .env_remove("PORT")
        .env_remove("RUST_LOG")
        .env_remove("UNIDASH_CONFIG")
        .env_remove("UNIDASH_SERVER__PORT")
        .env_remove("UNIDASH_SERVER__ALLOWLIST")
        .env_remove("UNIDASH_CONTROLLER__USERNAME")
        .env_remove("UNIDASH_CONTROLLER__PASSWORD");
    cmd
}

fn write_config(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("unidash.toml");
    std::fs::write(&path, body).unwrap();
    path.display().to_string()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = unidash_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    unidash_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("serve")
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("check-access")),
    );
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    unidash_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unidash"));
}

#[test]
fn completions_zsh() {
    let dir = TempDir::new().unwrap();
    unidash_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unidash"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let dir = TempDir::new().unwrap();
    unidash_cmd(dir.path())
        .arg("frobnicate")
        .assert()
        .code(2);
}

// ── Allowlist checks ────────────────────────────────────────────────

#[test]
fn check_access_reports_matching_rule() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[server]\nallowlist = [\"10.0.0.0/8\", \"::1\"]\n");

    unidash_cmd(dir.path())
        .args(["--config", &config, "check-access", "10.1.2.3", "::ffff:10.9.9.9"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("10.1.2.3  allow")
                .and(predicate::str::contains("(matched 10.0.0.0/8)")),
        );
}

#[test]
fn check_access_denial_exits_with_permission_code() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[server]\nallowlist = [\"10.0.0.0/8\"]\n");

    let output = unidash_cmd(dir.path())
        .args(["--config", &config, "check-access", "10.0.0.1", "192.168.1.1"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(5));
    let text = combined_output(&output);
    assert!(text.contains("192.168.1.1  deny"), "{text}");
    assert!(text.contains("1 of 2"), "{text}");
}

#[test]
fn local_config_file_is_picked_up() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "[server]\nallowlist = [\"172.16.0.0/12\"]\n");

    unidash_cmd(dir.path())
        .args(["check-access", "172.20.0.1"])
        .assert()
        .success();
}

#[test]
fn invalid_allowlist_entry_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[server]\nallowlist = [\"10.0.0.0/99\"]\n");

    let output = unidash_cmd(dir.path())
        .args(["--config", &config, "check-access", "10.0.0.1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("10.0.0.0/99"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn config_masks_password() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "[controller]\nurl = \"https://unifi.example.com:8443\"\nusername = \"admin\"\npassword = \"hunter22\"\n",
    );

    unidash_cmd(dir.path())
        .args(["--config", &config, "config"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("********")
                .and(predicate::str::contains("unifi.example.com"))
                .and(predicate::str::contains("hunter22").not()),
        );
}

#[test]
fn historical_env_vars_fill_credentials() {
    let dir = TempDir::new().unwrap();

    unidash_cmd(dir.path())
        .env("UNIFI_USER", "ops")
        .env("UNIFI_PASS", "from-env")
        .env("PORT", "8099")
        .arg("config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("username = \"ops\"")
                .and(predicate::str::contains("port = 8099"))
                .and(predicate::str::contains("from-env").not()),
        );
}

#[test]
fn malformed_config_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[server]\nport = \"not-a-port\"\n");

    unidash_cmd(dir.path())
        .args(["--config", &config, "config"])
        .assert()
        .code(2);
}

#[test]
fn sites_without_credentials_is_auth_error() {
    let dir = TempDir::new().unwrap();

    let output = unidash_cmd(dir.path()).arg("sites").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("UNIFI_USER"));
}

#[test]
fn sites_from_empty_snapshot_prints_nothing_in_plain_mode() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("snap.db");
    let config = write_config(
        &dir,
        &format!("[snapshot]\npath = \"{}\"\n", db.display()),
    );

    unidash_cmd(dir.path())
        .args(["--config", &config, "sites", "--snapshot", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
