#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;

/// Binary with a scrubbed configuration environment.
fn component_add() -> Command {
    let mut cmd = Command::cargo_bin("component-add").unwrap();
    for var in [
        "COMPONENT_ADD_CONFIG",
        "COMPONENT_ADD_LISTEN",
        "FTRACK_SERVER",
        "FTRACK_API_USER",
        "FTRACK_API_KEY",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("USER", "tester");
    cmd
}

#[test]
fn help_lists_verbosity_flag() {
    component_add()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"));
}

#[test]
fn invalid_verbosity_is_a_usage_error() {
    component_add()
        .args(["--verbosity", "loud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn missing_server_configuration_is_fatal() {
    component_add()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing FTRACK_SERVER"));
}

#[test]
fn unreachable_server_is_fatal() {
    component_add()
        .args(["-v", "error"])
        .env("FTRACK_SERVER", "http://127.0.0.1:1")
        .env("FTRACK_API_USER", "pipeline")
        .env("FTRACK_API_KEY", "secret")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("connecting to http://127.0.0.1:1"));
}

#[test]
fn unreadable_config_file_is_fatal() {
    component_add()
        .env("COMPONENT_ADD_CONFIG", "/no/such/component-add.yaml")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("loading configuration"));
}
