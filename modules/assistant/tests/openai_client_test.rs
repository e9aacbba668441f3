//! HTTP-level tests for the OpenAI-compatible completion adapter.

use httpmock::prelude::*;
use serde_json::json;

use assistant::config::AssistantConfig;
use assistant::domain::ports::{CompletionError, CompletionPort};
use assistant::infra::OpenAiCompletionClient;

fn client_for(server: &MockServer) -> OpenAiCompletionClient {
    let config = AssistantConfig {
        api_base_url: server.base_url(),
        request_timeout_ms: 2_000,
        ..AssistantConfig::default()
    };
    OpenAiCompletionClient::new(&config, "test-key".to_string()).unwrap()
}

#[tokio::test]
async fn sends_the_documented_request_shape_and_extracts_content() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key")
                .json_body_includes(
                    r#"{
                        "model": "gpt-3.5-turbo",
                        "max_tokens": 300,
                        "temperature": 0.7,
                        "messages": [{ "role": "user" }]
                    }"#,
                );
            then.status(200).json_body(json!({
                "choices": [{
                    "message": {
                        "content": "{\"suggestion\":\"Do the thing\",\"reasoning\":\"Soonest due\"}"
                    }
                }]
            }));
        })
        .await;

    let client = client_for(&server);
    let content = client.complete("what should I focus on?").await.unwrap();

    assert!(content.contains("Do the thing"));
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_reported_as_status_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).body("rate limited");
        })
        .await;

    let client = client_for(&server);
    let err = client.complete("prompt").await.unwrap_err();
    assert!(matches!(err, CompletionError::Status(429)));
}

#[tokio::test]
async fn missing_or_blank_content_is_an_empty_error() {
    let server = MockServer::start_async().await;

    // choices present but content null
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .json_body(json!({ "choices": [{ "message": { "content": null } }] }));
        })
        .await;

    let client = client_for(&server);
    let err = client.complete("prompt").await.unwrap_err();
    assert!(matches!(err, CompletionError::Empty));
}

#[tokio::test]
async fn unparseable_body_is_a_malformed_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body("<html>not json</html>");
        })
        .await;

    let client = client_for(&server);
    let err = client.complete("prompt").await.unwrap_err();
    assert!(matches!(err, CompletionError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // A port nothing listens on.
    let config = AssistantConfig {
        api_base_url: "http://127.0.0.1:1".to_string(),
        request_timeout_ms: 500,
        ..AssistantConfig::default()
    };
    let client = OpenAiCompletionClient::new(&config, "test-key".to_string()).unwrap();

    let err = client.complete("prompt").await.unwrap_err();
    assert!(matches!(err, CompletionError::Transport(_)));
}
