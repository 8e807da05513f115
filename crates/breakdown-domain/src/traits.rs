//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{CompletionReply, DocumentId, NewDocument, PromptSpec, SourceDocument};
use async_trait::async_trait;

/// Trait for fetching source documents and creating breakdown documents
///
/// Implemented by the infrastructure layer (breakdown-store)
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a document's title, space and markup body
    async fn fetch_document(&self, id: &DocumentId) -> Result<SourceDocument, Self::Error>;

    /// Create a new document, returning its identifier
    async fn create_document(&self, document: NewDocument) -> Result<DocumentId, Self::Error>;
}

/// Trait for chat-completion providers
///
/// Implemented by the infrastructure layer (breakdown-llm)
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Error type for completion operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send one prompt and return the model's raw reply. A single attempt.
    async fn complete(&self, prompt: &PromptSpec) -> Result<CompletionReply, Self::Error>;
}
