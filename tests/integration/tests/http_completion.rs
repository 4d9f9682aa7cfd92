//! HTTP completion adapter against a local mock backend.

use anyhow::Result;
use recap_engine::{CompletionClient, CompletionError, HttpCompletionClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> HttpCompletionClient {
    HttpCompletionClient::new(format!("{}/api/chat", server.uri()), "test-model")
        .expect("client builds")
}

#[tokio::test]
async fn successful_completion_returns_trimmed_text() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "stream": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"content": "  summarized text  "}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let text = client.complete("summarize this").await?;
    assert_eq!(text, "summarized text");
    Ok(())
}

#[tokio::test]
async fn empty_body_is_a_successful_empty_response() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    // Distinct from failure: the call succeeds with empty text
    let text = client.complete("anything").await?;
    assert!(text.is_empty());
    Ok(())
}

#[tokio::test]
async fn server_error_maps_to_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.complete("anything").await.unwrap_err();
    assert!(matches!(err, CompletionError::Status(500)));
}

#[tokio::test]
async fn malformed_body_maps_to_malformed_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.complete("anything").await.unwrap_err();
    assert!(matches!(err, CompletionError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_backend_maps_to_request_failure() {
    // Nothing listens on this port
    let client = HttpCompletionClient::new("http://127.0.0.1:9/api/chat", "test-model")
        .expect("client builds");
    let err = client.complete("anything").await.unwrap_err();
    assert!(matches!(
        err,
        CompletionError::Request(_) | CompletionError::Timeout(_)
    ));
}
