//! Integration tests for the `dsmon` CLI binary.
//!
//! Argument parsing, exit codes, and token/config handling run against an
//! isolated home directory; backend calls go to a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `dsmon` with every config and data directory pointed into `home`.
fn dsmon_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dsmon");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("DSMON_PROFILE")
        .env_remove("DSMON_SERVER")
        .env_remove("DSMON_TOKEN")
        .env_remove("DSMON_OUTPUT")
        .env_remove("DSMON_INSECURE")
        .env_remove("DSMON_TIMEOUT")
        .env_remove("DSMON_USERNAME")
        .env_remove("DSMON_PASSWORD");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn metrics_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "cpu", "value": 0.42},
            {"name": "mem", "value": 1024}
        ])))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = dsmon_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("metrics")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("login")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dsmon"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
    for shell in ["bash", "fish"] {
        dsmon_cmd(&home)
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::is_empty().not());
    }
}

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = dsmon_cmd(&home).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("foobar"));
}

// ── Error exit codes ────────────────────────────────────────────────

#[test]
fn test_metrics_without_config() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .arg("metrics")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No backend configured"));
}

#[test]
fn test_unknown_profile_is_usage_error() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["--profile", "staging", "metrics"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_invalid_server_url() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["--server", "not a url", "metrics"])
        .assert()
        .code(2);
}

#[test]
fn test_unreachable_server() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["--server", "http://127.0.0.1:9", "metrics"])
        .assert()
        .code(7);
}

// ── Backend commands ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_metrics_json_output() {
    let server = metrics_server().await;
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["--server", &server.uri(), "-o", "json", "metrics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cpu").and(predicate::str::contains("1024")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_flag_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["--server", &server.uri(), "--no-persist", "metrics"])
        .assert()
        .code(3);
    dsmon_cmd(&home)
        .args(["--server", &server.uri(), "--token", "abc123", "metrics"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_data_get_rejects_non_uuid() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["--server", &server.uri(), "data", "get", "bad-id"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bad-id"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"health": true})))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["--server", &server.uri(), "-o", "json", "health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = metrics_server().await;
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["--server", &server.uri(), "-o", "json", "watch", "-n", "1"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("cpu"));
}

// ── Token store ─────────────────────────────────────────────────────

#[test]
fn test_token_set_status_unset() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["-o", "plain", "token", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("absent"));
    dsmon_cmd(&home).args(["token", "set", "abc"]).assert().success();
    dsmon_cmd(&home)
        .args(["-o", "plain", "token", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stored"));
    dsmon_cmd(&home).args(["token", "unset"]).assert().success();
    dsmon_cmd(&home)
        .args(["-o", "plain", "token", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("absent"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_persisted_token_used_by_later_runs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .and(header("authorization", "Bearer saved-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "cpu"}])))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["token", "set", "saved-token"])
        .assert()
        .success();
    dsmon_cmd(&home)
        .args(["--server", &server.uri(), "-o", "json", "metrics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cpu"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home).args(["config", "show"]).assert().success();
}

#[test]
fn test_config_init_then_show() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["config", "init", "--server", "http://localhost:8080"])
        .assert()
        .success();
    dsmon_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8080"));
    dsmon_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    // A second init without --force must not clobber the profile.
    dsmon_cmd(&home)
        .args(["config", "init", "--server", "http://other:1"])
        .assert()
        .code(2);
}

#[test]
fn test_config_init_rejects_bad_url() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["config", "init", "--server", "::nope::"])
        .assert()
        .code(2);
}

#[test]
fn test_config_use_unknown_profile() {
    let home = TempDir::new().unwrap();
    dsmon_cmd(&home)
        .args(["config", "use", "missing"])
        .assert()
        .code(2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_output_default_applies_until_flag_given() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"health": true})))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let out = dsmon_cmd(&home).args(["config", "path"]).output().unwrap();
    let config_path = std::path::PathBuf::from(String::from_utf8(out.stdout).unwrap().trim());
    std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    std::fs::write(
        &config_path,
        format!(
            "[defaults]\noutput = \"json\"\n\n[profiles.default]\nserver = \"{}\"\n",
            server.uri()
        ),
    )
    .unwrap();

    dsmon_cmd(&home)
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"health\": true"));
    dsmon_cmd(&home)
        .args(["-o", "plain", "health"])
        .assert()
        .success()
        .stdout(predicate::str::diff("healthy\n"));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_watch_exits_cleanly_on_sigint() {
    use std::io::{BufRead, BufReader};
    use std::process::{Command, Stdio};

    let server = metrics_server().await;
    let home = TempDir::new().unwrap();

    let mut child = Command::new(assert_cmd::cargo::cargo_bin!("dsmon"))
        .args(["--server", &server.uri(), "-o", "json-compact", "watch"])
        .args(["--metrics-interval", "1h", "-n", "5"])
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("DSMON_PROFILE")
        .env_remove("DSMON_TOKEN")
        .env_remove("DSMON_OUTPUT")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // First snapshot printed: the watch loop is about to start.
    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut first = String::new();
    stdout.read_line(&mut first).unwrap();
    assert!(first.contains("cpu"), "{first}");
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(0), "{status:?}");
}
