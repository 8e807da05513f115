//! Breakdown Pipeline
//!
//! Converts a free-text requirements document into an epic / user story /
//! acceptance-criteria table and stores it as a new document.
//!
//! # Architecture
//!
//! ```text
//! DocumentStore → extract → compose → CompletionClient → parse → TableDocument → DocumentStore
//! ```
//!
//! Every stage consumes only the previous stage's output. Any failure ends
//! the invocation with a classified [`PipelineError`]; nothing is retried.
//!
//! # Example Usage
//!
//! ```no_run
//! use breakdown_domain::{DocumentId, ModelParameters};
//! use breakdown_llm::MockCompletionClient;
//! use breakdown_pipeline::BreakdownPipeline;
//! use breakdown_store::InMemoryDocumentStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryDocumentStore::new()
//!     .with_document("66354", "Login Flow", "SPACE", "<p>As a user I want to log in</p>");
//! let llm = MockCompletionClient::new(r#"[{"epic":"Auth","story":"Login"}]"#);
//!
//! let pipeline = BreakdownPipeline::new(llm, store, ModelParameters::default());
//! let outcome = pipeline.run(&DocumentId::from("66354")).await?;
//!
//! println!("Created {} with {} rows", outcome.title, outcome.rows.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extract;
mod parser;
mod pipeline;
mod prompt;
mod state;
pub mod telemetry;

pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError, Stage};
pub use extract::{extract, strip_markup, ExtractedSource};
pub use parser::{parse_and_serialize, parse_rows, ParsedBreakdown};
pub use pipeline::{BreakdownOutcome, BreakdownPipeline};
pub use prompt::{compose, SYSTEM_INSTRUCTION};
pub use state::{PipelineState, StateMachine};
