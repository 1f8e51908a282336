//! Integration tests for the helpdesk binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the caller's working directory and config dirs
fn helpdesk(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("helpdesk").unwrap();
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("HELPDESK_CONFIG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    helpdesk(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_init_then_show() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("helpdesk.yaml");

    helpdesk(&temp)
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));
    assert!(path.exists());

    helpdesk(&temp)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"port\": 5000"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("helpdesk.yaml");
    std::fs::write(&path, "server:\n  port: 6000\n").unwrap();

    helpdesk(&temp)
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    helpdesk(&temp)
        .args(["config", "init", "--force", "--path"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp = TempDir::new().unwrap();
    helpdesk(&temp)
        .args(["--config", "nope.yaml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_config_validate_rejects_bad_port() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("helpdesk.yaml"), "server:\n  port: 0\n").unwrap();

    helpdesk(&temp)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("server.port"));
}

#[test]
fn test_config_path_reports_local_file() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("helpdesk.yaml"), "tickets:\n  subject_max_length: 80\n")
        .unwrap();

    helpdesk(&temp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("helpdesk.yaml"));
}
