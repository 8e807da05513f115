//! Breakdown Domain Layer
//!
//! Core value types shared by every other crate in the workspace, plus the
//! trait seams to the two external collaborators (document store and
//! completion service).
//!
//! ## Key Concepts
//!
//! - **RequirementText**: markup-free requirement prose pulled from a document
//! - **PromptSpec**: the immutable instruction/content pair sent to the model
//! - **CompletionReply**: the model's raw, untrusted reply
//! - **BreakdownRow**: one epic / story / acceptance-criteria record
//! - **TableDocument**: the ADF table rendered from a sequence of rows
//!
//! ## Architecture
//!
//! Pure data and trait definitions only. Network adapters live in
//! `breakdown-llm` and `breakdown-store`; orchestration lives in
//! `breakdown-pipeline`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completion;
pub mod config;
pub mod document;
pub mod requirement;
pub mod row;
pub mod table;
pub mod traits;

// Re-exports for convenience
pub use completion::{CompletionReply, ModelParameters, PromptSpec};
pub use config::ConfigError;
pub use document::{DocumentId, NewDocument, SourceDocument, SpaceId};
pub use requirement::RequirementText;
pub use row::BreakdownRow;
pub use table::{AdfNode, TableDocument, HEADER_LABELS};
