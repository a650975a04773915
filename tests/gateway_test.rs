use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::{SECRET, commands_file, credit, fixtures_file, order};

#[tokio::test(flavor = "multi_thread")]
async fn test_order_then_credit_through_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(body_partial_json(serde_json::json!({
            "amount": 25000,
            "currency": "INR"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "order_cli_1",
            "amount": 25000,
            "currency": "INR",
            "receipt": "receipt_order_1",
            "status": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fixtures = fixtures_file();
    let commands = commands_file(&[
        order("alice", 25000),
        credit("alice", "order_cli_1", "pay_cli_1", 25000),
    ]);
    let uri = server.uri();

    let assert = tokio::task::spawn_blocking(move || {
        Command::new(cargo_bin!("contest-ledger"))
            .env_remove("RUST_LOG")
            .env_remove("LEDGER_DB_PATH")
            .env("LEDGER_GATEWAY_KEY_SECRET", SECRET)
            .arg(commands.path())
            .arg("--fixtures")
            .arg(fixtures.path())
            .arg("--key-id")
            .arg("rzp_test_key")
            .arg("--gateway-url")
            .arg(uri)
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("alice,Alice,250"))
        .stderr(predicate::str::contains("order_cli_1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gateway_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"code": "BAD_REQUEST_ERROR", "description": "Authentication failed"}
        })))
        .mount(&server)
        .await;

    let fixtures = fixtures_file();
    let commands = commands_file(&[order("alice", 1000)]);
    let uri = server.uri();

    let assert = tokio::task::spawn_blocking(move || {
        Command::new(cargo_bin!("contest-ledger"))
            .env_remove("RUST_LOG")
            .env_remove("LEDGER_DB_PATH")
            .env("LEDGER_GATEWAY_KEY_SECRET", SECRET)
            .arg(commands.path())
            .arg("--fixtures")
            .arg(fixtures.path())
            .arg("--key-id")
            .arg("rzp_test_key")
            .arg("--gateway-url")
            .arg(uri)
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("alice,Alice,0"))
        .stderr(predicate::str::contains("Authentication failed"));
}
