//! Breakdown Completion Layer
//!
//! Implementations of the `CompletionClient` trait from `breakdown-domain`.
//!
//! # Providers
//!
//! - `MockCompletionClient`: Deterministic mock for testing
//! - `AzureOpenAiClient`: Azure OpenAI chat-completions integration
//!
//! Every client makes exactly one attempt per call. Retry policy, if any,
//! belongs to whoever invokes the pipeline.
//!
//! # Examples
//!
//! ```
//! use breakdown_domain::traits::CompletionClient;
//! use breakdown_domain::{ModelParameters, PromptSpec};
//! use breakdown_llm::MockCompletionClient;
//!
//! # async fn example() {
//! let client = MockCompletionClient::new("[]");
//! let prompt = PromptSpec::new("system", "user", ModelParameters::default());
//! let reply = client.complete(&prompt).await.unwrap();
//! assert_eq!(reply.as_str(), "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod azure;
pub mod config;

use async_trait::async_trait;
use breakdown_domain::traits::CompletionClient;
use breakdown_domain::{CompletionReply, ConfigError, PromptSpec};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use azure::AzureOpenAiClient;
pub use config::CompletionConfig;

/// Errors that can occur during completion calls
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    /// The request did not complete within the configured timeout
    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success status, or the request never produced a response
    #[error("Upstream error: {message}")]
    Upstream {
        /// HTTP status, absent for transport failures
        status: Option<u16>,
        /// Human-readable summary
        message: String,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// Success status but the body has no usable completion
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// HTTP status of an upstream failure, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<ConfigError> for LlmError {
    fn from(e: ConfigError) -> Self {
        LlmError::Config(e.to_string())
    }
}

/// Mock completion client for deterministic testing
///
/// Returns a pre-configured reply (or error) without making any network
/// calls, and records every prompt it receives.
///
/// # Examples
///
/// ```
/// use breakdown_llm::{LlmError, MockCompletionClient};
///
/// let ok = MockCompletionClient::new("[]");
/// assert_eq!(ok.call_count(), 0);
///
/// let failing = MockCompletionClient::failing(LlmError::MalformedResponse("no choices".into()));
/// assert!(failing.last_prompt().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MockCompletionClient {
    outcome: Result<String, LlmError>,
    delay: Option<Duration>,
    prompts: Arc<Mutex<Vec<PromptSpec>>>,
}

impl MockCompletionClient {
    /// Create a mock that always replies with `reply`
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            outcome: Ok(reply.into()),
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always fails with `error`
    pub fn failing(error: LlmError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<PromptSpec> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    type Error = LlmError;

    async fn complete(&self, prompt: &PromptSpec) -> Result<CompletionReply, Self::Error> {
        self.prompts.lock().unwrap().push(prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.outcome.clone().map(CompletionReply::new)
    }
}
