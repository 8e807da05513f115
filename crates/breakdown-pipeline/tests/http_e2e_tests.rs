//! End-to-end tests of the production pipeline against mock HTTP services
//!
//! One wiremock server stands in for both Azure OpenAI and Confluence; the
//! paths do not overlap.

use breakdown_domain::DocumentId;
use breakdown_pipeline::{BreakdownPipeline, ErrorKind, PipelineConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const PAGE_PATH: &str = "/wiki/api/v2/pages/66354";
const CREATE_PATH: &str = "/wiki/api/v2/pages";
const COMPLETIONS_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";

fn config_for(server: &MockServer) -> PipelineConfig {
    let toml = format!(
        r#"
        [llm]
        endpoint = "{uri}/"
        api_key = "llm-key"
        timeout_ms = 2000

        [store]
        base_url = "{uri}"
        email = "bot@example.com"
        api_token = "store-token"
        timeout_ms = 2000
        "#,
        uri = server.uri()
    );
    PipelineConfig::from_toml(&toml).unwrap()
}

async fn mount_login_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "66354",
            "title": "Login Flow",
            "spaceId": "98304",
            "body": {"storage": {"value": "<p>As a user I want to log in</p>", "representation": "storage"}}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_flow_creates_one_breakdown_page() {
    let server = MockServer::start().await;
    mount_login_page(&server).await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(|req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            assert_eq!(body["messages"][1]["content"], "As a user I want to log in");
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "[{\"epic\":\"Auth\",\"story\":\"Login\",\"ac\":\"user can log in\",\"category\":\"security\",\"notes\":\"\"}]"}}]
            }))
        })
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(|req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            assert_eq!(body["title"], "Breakdown of Login Flow");
            assert_eq!(body["spaceId"], "98304");
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "70001"}))
        })
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = BreakdownPipeline::from_config(config_for(&server)).unwrap();
    let outcome = pipeline.run(&DocumentId::from("66354")).await.unwrap();

    assert_eq!(outcome.document_id.as_str(), "70001");
    assert_eq!(outcome.title, "Breakdown of Login Flow");
    assert_eq!(
        outcome.table.data_rows(),
        vec![vec!["Auth", "Login", "user can log in", "security", ""]]
    );
}

#[tokio::test]
async fn test_rate_limit_never_creates_page() {
    let server = MockServer::start().await;
    mount_login_page(&server).await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "Rate limit is exceeded. Try again in 10 seconds."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = BreakdownPipeline::from_config(config_for(&server)).unwrap();
    let err = pipeline.run(&DocumentId::from("66354")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("Rate limit is exceeded"));
}

#[tokio::test]
async fn test_missing_page_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = BreakdownPipeline::from_config(config_for(&server)).unwrap();
    let err = pipeline.run(&DocumentId::from("123")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_from_config_requires_secrets() {
    let config = PipelineConfig::from_toml(
        r#"
        [llm]
        endpoint = "https://example.openai.azure.com/"

        [store]
        base_url = "https://site.atlassian.net"
        email = "bot@example.com"
        "#,
    )
    .unwrap();

    let err = BreakdownPipeline::from_config(config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
