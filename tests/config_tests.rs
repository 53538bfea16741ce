//! Config command scenarios against an isolated config directory

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn voice_recorder(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("voice-recorder").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"));
    cmd
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home)
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key").and(predicate::str::contains("directory")));
}

#[test]
fn config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home)
        .args(["config", "set", "unknown_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_invalid_duration() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home)
        .args(["config", "set", "background_budget", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn config_set_invalid_directory() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home)
        .args(["config", "set", "directory", "downloads"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CACHE, LIBRARY, DOCUMENTS"));
}

#[test]
fn config_set_invalid_boolean() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home)
        .args(["config", "set", "notify", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'true' or 'false'"));
}

#[test]
fn config_list_with_no_file() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("background_budget").and(predicate::str::contains("(not set)")));
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home)
        .args(["config", "set", "sub_directory", "/memos/"])
        .assert()
        .success();

    voice_recorder(&home)
        .args(["config", "get", "sub_directory"])
        .assert()
        .success()
        .stdout("memos\n");
}

#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home).args(["config", "init"]).assert().success();

    voice_recorder(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_writes_defaults_that_list_shows() {
    let home = TempDir::new().unwrap();
    voice_recorder(&home).args(["config", "init"]).assert().success();

    voice_recorder(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DOCUMENTS").and(predicate::str::contains("aac")));
}
