//! Azure OpenAI Chat Completions Client
//!
//! Sends the composed system/user messages to an Azure OpenAI deployment
//! and returns the first choice's message content.
//!
//! # Behaviour
//!
//! - One POST per call, no retries
//! - Request bounded by the configured timeout, reported as [`LlmError::Timeout`]
//! - Non-success responses have their body read and logged before the
//!   classified [`LlmError::Upstream`] is returned
//!
//! # Examples
//!
//! ```no_run
//! use breakdown_llm::{AzureOpenAiClient, CompletionConfig};
//!
//! let config = CompletionConfig::new("https://my-resource.openai.azure.com/", "key")
//!     .with_deployment("gpt-4o");
//! let client = AzureOpenAiClient::new(config).unwrap();
//! ```

use crate::config::CompletionConfig;
use crate::LlmError;
use async_trait::async_trait;
use breakdown_domain::traits::CompletionClient;
use breakdown_domain::{CompletionReply, PromptSpec};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Longest body excerpt carried in an error message
const MAX_ERROR_EXCERPT: usize = 512;

/// Azure OpenAI chat-completions client
pub struct AzureOpenAiClient {
    config: CompletionConfig,
    client: reqwest::Client,
    url: String,
}

/// Request body for the chat completions API
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the chat completions API
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Error envelope: `{"error": {"message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl AzureOpenAiClient {
    /// Create a client from validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if the configuration is incomplete or the
    /// HTTP client cannot be built.
    pub fn new(config: CompletionConfig) -> Result<Self, LlmError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let url = completions_url(&config);

        Ok(Self {
            config,
            client,
            url,
        })
    }

    /// The fully-qualified chat completions URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body<'a>(&self, prompt: &'a PromptSpec) -> ChatRequest<'a> {
        let parameters = prompt.parameters();
        ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt.system_instruction(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user_content(),
                },
            ],
            temperature: parameters.temperature,
            max_tokens: parameters.max_tokens,
            top_p: parameters.top_p,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout())
        } else if e.is_connect() {
            LlmError::Upstream {
                status: None,
                message: format!("Connection failed: {}", e),
                body: String::new(),
            }
        } else {
            LlmError::Upstream {
                status: None,
                message: format!("Request failed: {}", e),
                body: String::new(),
            }
        }
    }
}

#[async_trait]
impl CompletionClient for AzureOpenAiClient {
    type Error = LlmError;

    async fn complete(&self, prompt: &PromptSpec) -> Result<CompletionReply, Self::Error> {
        let body = self.request_body(prompt);

        debug!(
            deployment = %self.config.deployment,
            user_chars = prompt.user_content().len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.url)
            .header("api-key", self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read error body: {}>", e));
            log_upstream_failure(status, &text);
            return Err(upstream_error(status, text));
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        parse_completion(&text)
    }
}

/// Build `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...`
fn completions_url(config: &CompletionConfig) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        config.endpoint.trim_end_matches('/'),
        config.deployment,
        config.api_version
    )
}

/// Record the full error body of a failed call
fn log_upstream_failure(status: StatusCode, body: &str) {
    error!(status = status.as_u16(), body = %body, "Completion service returned an error");
}

/// Classify a failed call, preferring the service's own error message
fn upstream_error(status: StatusCode, body: String) -> LlmError {
    let detail = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| excerpt(&body));

    LlmError::Upstream {
        status: Some(status.as_u16()),
        message: format!("HTTP {}: {}", status.as_u16(), detail),
        body,
    }
}

/// Pull the first choice's message content out of a success body
fn parse_completion(body: &str) -> Result<CompletionReply, LlmError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        LlmError::MalformedResponse(format!("Failed to parse response: {}", e))
    })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedResponse("Response contained no choices".to_string()))?;

    choice
        .message
        .and_then(|message| message.content)
        .map(CompletionReply::new)
        .ok_or_else(|| {
            LlmError::MalformedResponse("First choice has no message content".to_string())
        })
}

fn excerpt(body: &str) -> String {
    if body.len() <= MAX_ERROR_EXCERPT {
        return body.to_string();
    }
    let mut end = MAX_ERROR_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
