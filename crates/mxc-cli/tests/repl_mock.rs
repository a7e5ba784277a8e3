//! The interactive console driven through stdin.

mod support;

use std::fs;

use predicates::prelude::*;
use serde_json::json;
use support::{can_bind_localhost, mxc_against, seed_session, temp_mxc_home};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION: &str = "session-1700000000000";

async fn mount_context(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/session/context"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "interactions": [] })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_console_loads_context_chats_and_quits() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_mxc_home();
    seed_session(home.path(), SESSION);
    let server = MockServer::start().await;
    mount_context(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .and(body_json(json!({ "message": "hello", "sessionId": SESSION })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "hi!" })))
        .expect(1)
        .mount(&server)
        .await;

    mxc_against(home.path(), &server)
        .write_stdin("\n   \nhello\n:q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session: session-"))
        .stdout(predicate::str::contains("assistant> hi!"))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[tokio::test]
async fn test_console_exits_on_eof() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_mxc_home();
    let server = MockServer::start().await;
    mount_context(&server, 1).await;

    mxc_against(home.path(), &server)
        .arg("console")
        .write_stdin(":session\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session: session-"));
}

#[tokio::test]
async fn test_dropped_file_line_uploads() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_mxc_home();
    seed_session(home.path(), SESSION);
    let files = TempDir::new().unwrap();
    let dropped = files.path().join("meeting notes.txt");
    fs::write(&dropped, "ship it").unwrap();

    let server = MockServer::start().await;
    // once on start, once after the upload
    mount_context(&server, 2).await;
    Mock::given(method("POST"))
        .and(path("/session/add-interaction"))
        .and(body_json(json!({
            "sessionId": SESSION,
            "user": "CONTEXT WALL: meeting notes.txt\n\nship it...",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    mxc_against(home.path(), &server)
        .write_stdin(format!("'{}'\n:q\n", dropped.display()))
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Uploaded to session memory! Reload context.",
        ));
}
