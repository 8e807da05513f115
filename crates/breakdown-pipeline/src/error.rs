//! Error types for the breakdown pipeline

use breakdown_llm::LlmError;
use breakdown_store::StoreError;
use std::fmt;
use thiserror::Error;

/// Pipeline stage in which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Fetching and sanitizing the source document
    Extraction,
    /// Building the prompt
    Composition,
    /// Waiting on the completion service
    Completion,
    /// Parsing the model reply into rows
    Parsing,
    /// Creating the breakdown document
    Persistence,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extraction => "extraction",
            Stage::Composition => "composition",
            Stage::Completion => "completion",
            Stage::Parsing => "parsing",
            Stage::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

/// Classification of a pipeline failure, as reported to the invoker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The source document does not exist
    NotFound,
    /// The source document has no requirement text
    EmptyContent,
    /// An upstream service did not answer in time
    UpstreamTimeout,
    /// An upstream service failed or returned a non-success status
    Upstream,
    /// An upstream service answered successfully with an unusable body
    MalformedUpstreamResponse,
    /// The model reply is not a JSON array of row objects
    InvalidModelOutput,
    /// The pipeline could not be configured
    Configuration,
    /// The invocation was cancelled
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::EmptyContent => "EmptyContentError",
            ErrorKind::UpstreamTimeout => "UpstreamTimeoutError",
            ErrorKind::Upstream => "UpstreamError",
            ErrorKind::MalformedUpstreamResponse => "MalformedUpstreamResponseError",
            ErrorKind::InvalidModelOutput => "InvalidModelOutputError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Cancelled => "CancelledError",
        };
        f.write_str(name)
    }
}

/// Errors that end a pipeline invocation. None are retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Source document is empty once markup is removed
    #[error("Document {0} has no requirement text after markup removal")]
    EmptyContent(String),

    /// Upstream call exceeded its timeout
    #[error("Upstream timeout during {stage}: {message}")]
    UpstreamTimeout {
        /// Stage that timed out
        stage: Stage,
        /// Detail
        message: String,
    },

    /// Upstream call failed
    #[error("Upstream error during {stage}: {message}")]
    Upstream {
        /// Stage that failed
        stage: Stage,
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Detail
        message: String,
        /// Raw upstream body, for diagnostics
        body: String,
    },

    /// Upstream answered with an unusable body
    #[error("Malformed upstream response during {stage}: {message}")]
    MalformedUpstreamResponse {
        /// Stage that received the body
        stage: Stage,
        /// Detail
        message: String,
    },

    /// Model reply could not be turned into rows
    #[error("Invalid model output: {reason}")]
    InvalidModelOutput {
        /// Why the reply was rejected
        reason: String,
        /// The offending reply text
        raw: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The invocation was cancelled before it finished
    #[error("Invocation cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Classification of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::EmptyContent(_) => ErrorKind::EmptyContent,
            PipelineError::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
            PipelineError::Upstream { .. } => ErrorKind::Upstream,
            PipelineError::MalformedUpstreamResponse { .. } => {
                ErrorKind::MalformedUpstreamResponse
            }
            PipelineError::InvalidModelOutput { .. } => ErrorKind::InvalidModelOutput,
            PipelineError::Config(_) => ErrorKind::Configuration,
            PipelineError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Stage the failure belongs to, when it belongs to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::NotFound(_) | PipelineError::EmptyContent(_) => Some(Stage::Extraction),
            PipelineError::UpstreamTimeout { stage, .. }
            | PipelineError::Upstream { stage, .. }
            | PipelineError::MalformedUpstreamResponse { stage, .. } => Some(*stage),
            PipelineError::InvalidModelOutput { .. } => Some(Stage::Parsing),
            PipelineError::Config(_) | PipelineError::Cancelled => None,
        }
    }

    pub(crate) fn invalid_output(reason: impl Into<String>, raw: &str) -> Self {
        PipelineError::InvalidModelOutput {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    /// Map a store failure while fetching the source document
    pub(crate) fn from_fetch(e: StoreError) -> Self {
        let stage = Stage::Extraction;
        match e {
            StoreError::NotFound(id) => PipelineError::NotFound(id),
            StoreError::Timeout(after) => PipelineError::UpstreamTimeout {
                stage,
                message: format!("document store did not answer within {:?}", after),
            },
            StoreError::Upstream {
                status,
                message,
                body,
            } => PipelineError::Upstream {
                stage,
                status,
                message,
                body,
            },
            StoreError::MalformedResponse(message) => {
                PipelineError::MalformedUpstreamResponse { stage, message }
            }
            StoreError::Serialization(message) => PipelineError::Upstream {
                stage,
                status: None,
                message,
                body: String::new(),
            },
            StoreError::Config(message) => PipelineError::Config(message),
        }
    }

    /// Map a store failure while creating the breakdown document.
    ///
    /// Every persistence failure is reported as an upstream error.
    pub(crate) fn from_persistence(e: StoreError) -> Self {
        let (status, body) = match &e {
            StoreError::Upstream { status, body, .. } => (*status, body.clone()),
            _ => (None, String::new()),
        };
        PipelineError::Upstream {
            stage: Stage::Persistence,
            status,
            message: e.to_string(),
            body,
        }
    }
}

impl From<LlmError> for PipelineError {
    fn from(e: LlmError) -> Self {
        let stage = Stage::Completion;
        match e {
            LlmError::Timeout(after) => PipelineError::UpstreamTimeout {
                stage,
                message: format!("completion service did not answer within {:?}", after),
            },
            LlmError::Upstream {
                status,
                message,
                body,
            } => PipelineError::Upstream {
                stage,
                status,
                message,
                body,
            },
            LlmError::MalformedResponse(message) => {
                PipelineError::MalformedUpstreamResponse { stage, message }
            }
            LlmError::Config(message) => PipelineError::Config(message),
        }
    }
}

impl From<breakdown_domain::ConfigError> for PipelineError {
    fn from(e: breakdown_domain::ConfigError) -> Self {
        PipelineError::Config(e.to_string())
    }
}
