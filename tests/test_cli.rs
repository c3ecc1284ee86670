//! Binary invocation tests (assert_cmd): flags, init scaffolding, startup
//! failures.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

/// Env vars the config layer falls back to; scrubbed so a developer's
/// shell cannot leak credentials into these tests.
const CONFIG_ENV_VARS: &[&str] = &[
    "EMAIL_HOST",
    "EMAIL_PORT",
    "EMAIL_USER",
    "EMAIL_PASS",
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "TWILIO_FROM",
    "TWILIO_TO",
];

fn mailferry_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("mailferry");
    for var in CONFIG_ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = mailferry_cmd();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("mailferry"));
}

#[test]
fn test_cli_help() {
    let mut cmd = mailferry_cmd();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Forward unread IMAP email"));
}

#[test]
fn test_cli_no_args_shows_error() {
    let mut cmd = mailferry_cmd();
    cmd.assert().failure();
}

#[test]
fn test_cli_unknown_subcommand() {
    let mut cmd = mailferry_cmd();
    cmd.arg("frobnicate");
    cmd.assert().failure();
}

#[test]
fn test_forward_without_config_names_missing_settings() {
    let tmp = common::temp_dir();
    let mut cmd = mailferry_cmd();
    cmd.current_dir(tmp.path()).arg("forward");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing required settings"));
}

#[test]
fn test_list_with_nonexistent_config_path() {
    let mut cmd = mailferry_cmd();
    cmd.args(["--config", "/nonexistent/.mailferry.toml", "list"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_init_writes_starter_config() {
    let tmp = common::temp_dir();
    let mut cmd = mailferry_cmd();
    cmd.arg("init").arg(tmp.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let written = std::fs::read_to_string(tmp.path().join(".mailferry.toml")).unwrap();
    assert!(written.contains("[mailbox]"));
    assert!(written.contains("[gateway]"));
}

#[test]
fn test_init_refuses_overwrite_without_force() {
    let tmp = common::temp_dir();
    let mut cmd = mailferry_cmd();
    cmd.arg("init").arg(tmp.path());
    cmd.assert().success();

    let mut again = mailferry_cmd();
    again.arg("init").arg(tmp.path());
    again
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let mut forced = mailferry_cmd();
    forced.arg("init").arg(tmp.path()).arg("--force");
    forced.assert().success();
}

#[test]
fn test_send_test_surfaces_gateway_failure() {
    let tmp = common::temp_dir();
    let config_path = tmp.path().join(".mailferry.toml");
    std::fs::write(
        &config_path,
        r#"[mailbox]
host = "imap.example.com"
user = "tester@example.com"
password = "pw"

[gateway]
account_sid = "ACtest"
auth_token = "secret"
from = "whatsapp:+14155238886"
to = "whatsapp:+15551234567"
base_url = "http://127.0.0.1:1"
"#,
    )
    .unwrap();

    let mut cmd = mailferry_cmd();
    cmd.args(["--config", config_path.to_str().unwrap(), "send-test"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("send failed"));
}
