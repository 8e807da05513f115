//! Breakdown Document Store Layer
//!
//! Implementations of the `DocumentStore` trait from `breakdown-domain`.
//!
//! # Stores
//!
//! - `InMemoryDocumentStore`: seeded in-process store for testing
//! - `ConfluenceStore`: Confluence Cloud REST (v2) integration

#![warn(missing_docs)]

pub mod config;
pub mod confluence;
mod memory;

use breakdown_domain::ConfigError;
use std::time::Duration;
use thiserror::Error;

pub use config::ConfluenceConfig;
pub use confluence::ConfluenceStore;
pub use memory::InMemoryDocumentStore;

/// Errors that can occur during document store operations
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// No document with this identifier
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The store did not answer within the configured timeout
    #[error("Document store timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success status or transport failure
    #[error("Document store error: {message}")]
    Upstream {
        /// HTTP status, absent for transport failures
        status: Option<u16>,
        /// Human-readable summary
        message: String,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// Success status but the body could not be interpreted
    #[error("Malformed document store response: {0}")]
    MalformedResponse(String),

    /// An outgoing request body could not be serialized
    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    /// Store could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        StoreError::Config(e.to_string())
    }
}
