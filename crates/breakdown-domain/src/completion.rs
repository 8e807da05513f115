//! Prompt and reply values exchanged with the completion service

use serde::{Deserialize, Serialize};

/// Sampling parameters forwarded to the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Nucleus sampling mass
    pub top_p: f32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1500,
            top_p: 1.0,
        }
    }
}

/// An immutable system/user prompt pair plus sampling parameters.
///
/// Built once per invocation by the prompt composer and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptSpec {
    system_instruction: String,
    user_content: String,
    parameters: ModelParameters,
}

impl PromptSpec {
    /// Create a prompt spec
    pub fn new(
        system_instruction: impl Into<String>,
        user_content: impl Into<String>,
        parameters: ModelParameters,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_content: user_content.into(),
            parameters,
        }
    }

    /// The system role message
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// The user role message
    pub fn user_content(&self) -> &str {
        &self.user_content
    }

    /// Sampling parameters
    pub fn parameters(&self) -> ModelParameters {
        self.parameters
    }
}

/// Raw text returned by the model. Untrusted until parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReply(String);

impl CompletionReply {
    /// Wrap a reply
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// Borrow the reply text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CompletionReply {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
