//! Integration tests for both completion backends using wiremock.

use assist_core::AppError;
use assist_llm::{create_client, LlmRequest};
use assist_platform::{PlatformClient, PlatformSettings};
use futures::StreamExt;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn platform(server: &MockServer) -> PlatformClient {
    PlatformClient::new(PlatformSettings::new(server.uri(), "test-token")).unwrap()
}

const SSE_BODY: &str = concat!(
    "data: {\"id\":\"1\",\"model\":\"claude-3-5-sonnet\",\"choices\":[{\"delta\":{\"content\":\"The member \"}}]}\n\n",
    "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"called twice.\"}}]}\n\n",
    "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"\"},\"finish_reason\":\"stop\"}],",
    "\"usage\":{\"prompt_tokens\":40,\"completion_tokens\":5,\"total_tokens\":45}}\n\n",
);

#[tokio::test]
async fn test_rest_complete_aggregates_events() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/cortex/inference:complete"))
        .and(body_partial_json(serde_json::json!({
            "model": "claude-3-5-sonnet",
            "messages": [{"role": "user", "content": "Summarize the call"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client("api", platform(&server)).unwrap();
    let response = client
        .complete(&LlmRequest::new("Summarize the call", "claude-3-5-sonnet"))
        .await
        .expect("completion should succeed");

    assert_eq!(response.content, "The member called twice.");
    assert_eq!(response.usage.total_tokens, 45);
}

#[tokio::test]
async fn test_rest_stream_yields_incremental_chunks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/cortex/inference:complete"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
        .mount(&server)
        .await;

    let client = create_client("api", platform(&server)).unwrap();
    let mut stream = client
        .stream(&LlmRequest::new("q", "claude-3-5-sonnet"))
        .await
        .unwrap();

    let mut pieces = Vec::new();
    while let Some(chunk) = stream.next().await {
        pieces.push(chunk.unwrap());
    }

    assert_eq!(pieces.len(), 3);
    assert_eq!(pieces[0].content, "The member ");
    assert!(pieces[2].done);
}

#[tokio::test]
async fn test_rest_accepts_plain_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/cortex/inference:complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "mistral-large2",
            "choices": [{"message": {"content": "Recordings"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
        })))
        .mount(&server)
        .await;

    let client = create_client("api", platform(&server)).unwrap();
    let response = client
        .complete(&LlmRequest::new("classify", "mistral-large2"))
        .await
        .unwrap();

    assert_eq!(response.content, "Recordings");
    assert_eq!(response.usage.completion_tokens, 1);
}

#[tokio::test]
async fn test_rest_http_error_is_completion_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/cortex/inference:complete"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown model"))
        .mount(&server)
        .await;

    let client = create_client("api", platform(&server)).unwrap();
    let result = client.complete(&LlmRequest::new("q", "nope")).await;

    match result {
        Err(AppError::Completion(msg)) => assert!(msg.contains("unknown model")),
        other => panic!("expected completion error, got {:?}", other.map(|r| r.content)),
    }
}

#[tokio::test]
async fn test_sql_mode_binds_model_and_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(body_partial_json(serde_json::json!({
            "statement": "SELECT snowflake.cortex.complete(?, ?) AS response",
            "bindings": {
                "1": {"type": "TEXT", "value": "llama3-70b"},
                "2": {"type": "TEXT", "value": "What is covered?"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resultSetMetaData": {"numRows": 1, "rowType": [{"name": "RESPONSE"}]},
            "data": [["Preventive care is covered."]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client("sql", platform(&server)).unwrap();
    let response = client
        .complete(&LlmRequest::new("What is covered?", "llama3-70b"))
        .await
        .unwrap();

    assert_eq!(response.content, "Preventive care is covered.");
}

#[tokio::test]
async fn test_sql_mode_empty_result_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resultSetMetaData": {"numRows": 0, "rowType": [{"name": "RESPONSE"}]},
            "data": []
        })))
        .mount(&server)
        .await;

    let client = create_client("sql", platform(&server)).unwrap();
    let result = client.complete(&LlmRequest::new("q", "llama3-70b")).await;
    assert!(matches!(result, Err(AppError::Completion(_))));
}

#[tokio::test]
async fn test_rest_completion_outlasts_request_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/cortex/inference:complete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(SSE_BODY, "text/event-stream")
                .set_delay(Duration::from_millis(600)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = PlatformSettings::new(server.uri(), "test-token");
    settings.timeout = Duration::from_millis(200);
    let client = create_client("api", PlatformClient::new(settings).unwrap()).unwrap();

    let response = client
        .complete(&LlmRequest::new("Summarize the call", "claude-3-5-sonnet"))
        .await
        .expect("slow completion should still finish");
    assert_eq!(response.content, "The member called twice.");
}
