//! Bridge client tests against a mock HTTP server (no real bridge needed).

use httpmock::prelude::*;
use lib::session::{BridgeSession, SessionStatus};

fn session_for(server: &MockServer, instance: &str) -> BridgeSession {
    BridgeSession::new(
        Some(server.base_url()),
        Some("test-key".to_string()),
        instance.to_string(),
    )
}

#[tokio::test]
async fn send_text_posts_number_and_text() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/message/sendText/main")
            .header("apikey", "test-key")
            .json_body(serde_json::json!({
                "number": "4915112345678@c.us",
                "text": "hello"
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "status": "PENDING" }));
    });

    let session = session_for(&server, "main");
    session
        .send_text("4915112345678@c.us", "hello")
        .await
        .expect("send ok");
    mock.assert();
}

#[tokio::test]
async fn send_text_surfaces_status_and_body_on_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/message/sendText/main");
        then.status(401).body("Unauthorized");
    });

    let session = session_for(&server, "main");
    let err = session
        .send_text("4915112345678@c.us", "hello")
        .await
        .expect_err("send fails");
    let msg = err.to_string();
    assert!(msg.contains("sendText failed: 401"), "got: {}", msg);
    assert!(msg.contains("Unauthorized"), "got: {}", msg);
}

#[tokio::test]
async fn send_media_posts_url_and_caption() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/message/sendMedia/main")
            .header("apikey", "test-key")
            .json_body(serde_json::json!({
                "number": "4915112345678@c.us",
                "mediaUrl": "http://files/doc.pdf",
                "caption": "the doc"
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "status": "PENDING" }));
    });

    let session = session_for(&server, "main");
    session
        .send_media("4915112345678@c.us", "http://files/doc.pdf", "the doc")
        .await
        .expect("send ok");
    mock.assert();
}

#[tokio::test]
async fn connection_state_accepts_nested_and_flat_shapes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/instance/connectionState/nested");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "instance": { "state": "open" } }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/instance/connectionState/flat");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "state": "connecting" }));
    });

    let nested = session_for(&server, "nested");
    assert_eq!(
        nested.connection_state().await.expect("probe"),
        SessionStatus::Ready
    );

    let flat = session_for(&server, "flat");
    assert_eq!(
        flat.connection_state().await.expect("probe"),
        SessionStatus::Connecting
    );
}

#[tokio::test]
async fn connection_state_errors_on_unreachable_instance() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/instance/connectionState/main");
        then.status(404).body("instance not found");
    });

    let session = session_for(&server, "main");
    let err = session.connection_state().await.expect_err("probe fails");
    let msg = err.to_string();
    assert!(msg.contains("connectionState failed: 404"), "got: {}", msg);
}
