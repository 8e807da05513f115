//! HTTP-level tests for the Azure OpenAI client against a mock server

use breakdown_domain::traits::CompletionClient;
use breakdown_domain::{ModelParameters, PromptSpec};
use breakdown_llm::{AzureOpenAiClient, CompletionConfig, LlmError};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";

fn client_for(server: &MockServer) -> AzureOpenAiClient {
    let config = CompletionConfig::new(server.uri(), "test-key")
        .with_timeout(Duration::from_millis(500));
    AzureOpenAiClient::new(config).unwrap()
}

fn prompt() -> PromptSpec {
    PromptSpec::new(
        "You are a senior agile product manager assistant.",
        "As a user I want to log in",
        ModelParameters::default(),
    )
}

#[tokio::test]
async fn test_successful_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(query_param("api-version", "2024-12-01-preview"))
        .and(header("api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "system", "content": "You are a senior agile product manager assistant."},
                {"role": "user", "content": "As a user I want to log in"}
            ],
            "max_tokens": 1500
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "[{\"epic\":\"Auth\"}]"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).complete(&prompt()).await.unwrap();
    assert_eq!(reply.as_str(), "[{\"epic\":\"Auth\"}]");
}

#[tokio::test]
async fn test_rate_limit_is_upstream_error_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"code": "429", "message": "Requests to the deployment have exceeded the rate limit"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&prompt()).await.unwrap_err();
    match err {
        LlmError::Upstream {
            status,
            message,
            body,
        } => {
            assert_eq!(status, Some(429));
            assert!(message.contains("exceeded the rate limit"));
            assert!(body.contains("\"code\""));
        }
        other => panic!("Expected Upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_retry_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&prompt()).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    // MockServer verifies `expect(1)` on drop
}

#[tokio::test]
async fn test_missing_choices_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, LlmError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"choices": [{"message": {"content": "[]"}}]}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, LlmError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_upstream_error() {
    let config = CompletionConfig::new("http://127.0.0.1:1", "key");
    let client = AzureOpenAiClient::new(config).unwrap();

    let err = client.complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, LlmError::Upstream { status: None, .. }), "got {:?}", err);
}
