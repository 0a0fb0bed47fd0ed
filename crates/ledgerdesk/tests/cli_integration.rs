//! CLI integration tests for the Ledgerdesk command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Invalid inputs are rejected with appropriate messages
//! - Login, refresh and logout work end to end against a mock backend
//!
//! Every test points `LEDGERDESK_CONFIG_DIR` at a temporary directory so
//! the user's real config and tokens are never touched.

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a command for the ledgerdesk binary with an isolated config dir.
fn ledgerdesk(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ledgerdesk").unwrap();
    cmd.env("LEDGERDESK_CONFIG_DIR", config_dir)
        .env_remove("LEDGERDESK_API_URL")
        .env("NO_COLOR", "1");
    cmd
}

fn write_tokens(config_dir: &Path, access: &str, refresh: &str) {
    let tokens = json!({ "access_token": access, "refresh_token": refresh });
    std::fs::write(
        config_dir.join("tokens.json"),
        serde_json::to_string_pretty(&tokens).unwrap(),
    )
    .unwrap();
}

fn read_tokens(config_dir: &Path) -> Value {
    let contents = std::fs::read_to_string(config_dir.join("tokens.json")).unwrap();
    serde_json::from_str(&contents).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ledgerdesk"))
        .stdout(predicate::str::contains("accounting office"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ledgerdesk"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("clients"))
        .stdout(predicate::str::contains("obligations"))
        .stdout(predicate::str::contains("transactions"))
        .stdout(predicate::str::contains("licenses"))
        .stdout(predicate::str::contains("reports"))
        .stdout(predicate::str::contains("users"))
        .stdout(predicate::str::contains("portal"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_auth_help() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("whoami"));
}

#[test]
fn test_obligations_help() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args(["obligations", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("progress"));
}

#[test]
fn test_transactions_help() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args(["transactions", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aging"))
        .stdout(predicate::str::contains("invoice"))
        .stdout(predicate::str::contains("cancel-invoice"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Parsing Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_global_flags_accepted() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args(["--verbose", "--json", "--api-url", "http://localhost:9999", "--help"])
        .assert()
        .success();
}

#[test]
fn test_unknown_subcommand_rejected() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .arg("payroll")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_client_status_rejected() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args(["clients", "list", "--status", "archived"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_invalid_amount_rejected() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args([
            "transactions",
            "create",
            "--kind",
            "receivable",
            "--description",
            "Bookkeeping",
            "--amount",
            "12.345",
            "--due",
            "2026-11-10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("two decimals"));
}

#[test]
fn test_invalid_date_rejected() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args(["licenses", "renew", "l-1", "--expires-on", "next-year"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Offline Commands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_init_and_show() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args(["config", "init", "--api-url", "https://office.example/api/v1"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("api-url = \"https://office.example/api/v1\""));

    ledgerdesk(dir.path())
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"api-url\": \"https://office.example/api/v1\""));
}

#[test]
fn test_auth_status_without_session() {
    let dir = TempDir::new().unwrap();
    ledgerdesk(dir.path())
        .args(["--json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"authenticated\": false"));
}

#[test]
fn test_logout_clears_token_file() {
    let dir = TempDir::new().unwrap();
    write_tokens(dir.path(), "A1", "R1");

    ledgerdesk(dir.path())
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    assert_eq!(read_tokens(dir.path()), json!({}));
}

// ─────────────────────────────────────────────────────────────────────────────
// Against a mock backend
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "owner@office.example", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "user": {
                "id": "u-1",
                "email": "owner@office.example",
                "full_name": "Office Owner",
                "role": "admin"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = ledgerdesk(dir.path());
    cmd.env("LEDGERDESK_API_URL", format!("{}/api/v1", server.uri()))
        .args(["auth", "login", "--email", "owner@office.example", "--password-stdin"])
        .write_stdin("secret\n");

    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();
    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Office Owner"));

    let tokens = read_tokens(dir.path());
    assert_eq!(tokens["access_token"], "A1");
    assert_eq!(tokens["refresh_token"], "R1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_is_refreshed_and_saved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "c-1",
                "legal_name": "Acme Holdings Ltd",
                "tax_id": "12.345.678/0001-90",
                "status": "active"
            }],
            "total": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "A2"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_tokens(dir.path(), "A1", "R1");

    let mut cmd = ledgerdesk(dir.path());
    cmd.env("LEDGERDESK_API_URL", format!("{}/api/v1", server.uri()))
        .args(["--json", "clients", "list"]);

    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();
    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Holdings Ltd"));

    let tokens = read_tokens(dir.path());
    assert_eq!(tokens["access_token"], "A2");
    assert_eq!(tokens["refresh_token"], "R1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_refresh_ends_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "refresh token revoked"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_tokens(dir.path(), "A1", "R1");

    let mut cmd = ledgerdesk(dir.path());
    cmd.env("LEDGERDESK_API_URL", format!("{}/api/v1", server.uri()))
        .args(["auth", "whoami"]);

    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();
    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("ledgerdesk auth login"));

    assert_eq!(read_tokens(dir.path()), json!({}));
}
