//! Breakdown pipeline orchestration

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::extract::extract;
use crate::parser::parse_and_serialize;
use crate::prompt::compose;
use crate::state::StateMachine;
use breakdown_domain::traits::{CompletionClient, DocumentStore};
use breakdown_domain::{BreakdownRow, DocumentId, ModelParameters, NewDocument, TableDocument};
use breakdown_llm::{AzureOpenAiClient, LlmError};
use breakdown_store::{ConfluenceStore, StoreError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of a successful invocation
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownOutcome {
    /// Identifier of the created breakdown document
    pub document_id: DocumentId,
    /// Title of the created breakdown document
    pub title: String,
    /// Rows parsed from the model reply
    pub rows: Vec<BreakdownRow>,
    /// Table body written to the new document
    pub table: TableDocument,
}

/// Turns a requirements document into a breakdown document.
///
/// Each call to [`run`](Self::run) is an independent, strictly sequential
/// invocation: extract, compose, complete, parse, create. Clones share the
/// underlying clients but no mutable state, so concurrent invocations for
/// different documents are safe.
pub struct BreakdownPipeline<C, S> {
    completion: Arc<C>,
    store: Arc<S>,
    parameters: ModelParameters,
}

impl<C, S> Clone for BreakdownPipeline<C, S> {
    fn clone(&self) -> Self {
        Self {
            completion: Arc::clone(&self.completion),
            store: Arc::clone(&self.store),
            parameters: self.parameters,
        }
    }
}

impl BreakdownPipeline<AzureOpenAiClient, ConfluenceStore> {
    /// Build the production pipeline from validated configuration
    pub fn from_config(config: PipelineConfig) -> Result<Self, PipelineError> {
        let parameters = config.llm.parameters();
        let completion = AzureOpenAiClient::new(config.llm)?;
        let store = ConfluenceStore::new(config.store)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Ok(Self::new(completion, store, parameters))
    }
}

impl<C, S> BreakdownPipeline<C, S>
where
    C: CompletionClient<Error = LlmError>,
    S: DocumentStore<Error = StoreError>,
{
    /// Create a pipeline from its collaborators
    pub fn new(completion: C, store: S, parameters: ModelParameters) -> Self {
        Self {
            completion: Arc::new(completion),
            store: Arc::new(store),
            parameters,
        }
    }

    /// Model parameters used for every prompt
    pub fn parameters(&self) -> ModelParameters {
        self.parameters
    }

    /// Run one invocation for `document_id`.
    ///
    /// No document is created unless every earlier stage succeeds. Dropping
    /// the returned future aborts the in-flight HTTP call; dropping it before
    /// the create step begins guarantees nothing is created. Dropping it
    /// while the create request is in flight leaves the outcome unknown.
    pub async fn run(&self, document_id: &DocumentId) -> Result<BreakdownOutcome, PipelineError> {
        let mut machine = StateMachine::new(document_id.clone());
        info!(document_id = %document_id, "Starting breakdown");

        match self.execute(document_id, &mut machine).await {
            Ok(outcome) => {
                machine.advance();
                info!(
                    document_id = %document_id,
                    created = %outcome.document_id,
                    rows = outcome.rows.len(),
                    "Breakdown complete"
                );
                Ok(outcome)
            }
            Err(e) => {
                let failed_in = machine.state();
                machine.fail(e.kind());
                warn!(
                    document_id = %document_id,
                    state = %failed_in,
                    kind = %e.kind(),
                    error = %e,
                    "Breakdown failed"
                );
                Err(e)
            }
        }
    }

    /// Run one invocation, abandoning it when `cancel` fires first.
    ///
    /// Cancellation drops the in-flight future, so the same guarantees as
    /// dropping [`run`](Self::run) apply.
    pub async fn run_with_cancel(
        &self,
        document_id: &DocumentId,
        cancel: &CancellationToken,
    ) -> Result<BreakdownOutcome, PipelineError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(document_id = %document_id, "Breakdown cancelled");
                Err(PipelineError::Cancelled)
            }
            result = self.run(document_id) => result,
        }
    }

    async fn execute(
        &self,
        document_id: &DocumentId,
        machine: &mut StateMachine,
    ) -> Result<BreakdownOutcome, PipelineError> {
        machine.advance();
        let source = extract(self.store.as_ref(), document_id).await?;

        machine.advance();
        let prompt = compose(&source.requirement_text, self.parameters);
        debug!(
            system_chars = prompt.system_instruction().len(),
            user_chars = prompt.user_content().len(),
            "Composed prompt"
        );

        machine.advance();
        let reply = self.completion.complete(&prompt).await?;
        debug!(reply_chars = reply.as_str().len(), "Received completion");

        machine.advance();
        let parsed = parse_and_serialize(&reply)?;
        drop(reply);

        // Serialized, then Persisting
        machine.advance();
        machine.advance();
        let new_document =
            NewDocument::breakdown_of(&source.title, source.space_id, parsed.table.clone());
        let title = new_document.title.clone();
        let created = self
            .store
            .create_document(new_document)
            .await
            .map_err(PipelineError::from_persistence)?;

        Ok(BreakdownOutcome {
            document_id: created,
            title,
            rows: parsed.rows,
            table: parsed.table,
        })
    }
}
