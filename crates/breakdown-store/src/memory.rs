//! In-memory document store

use crate::StoreError;
use async_trait::async_trait;
use breakdown_domain::traits::DocumentStore;
use breakdown_domain::{DocumentId, NewDocument, SourceDocument, SpaceId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Document store backed by a `HashMap`, for tests and local runs.
///
/// Clones share state, so a test can keep a handle and inspect what the
/// pipeline created.
///
/// # Examples
///
/// ```
/// use breakdown_store::InMemoryDocumentStore;
///
/// let store = InMemoryDocumentStore::new()
///     .with_document("66354", "Login Flow", "SPACE", "<p>As a user I want to log in</p>");
/// assert!(store.created().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<Mutex<HashMap<DocumentId, SourceDocument>>>,
    created: Arc<Mutex<Vec<(DocumentId, NewDocument)>>>,
    create_failure: Option<StoreError>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document
    pub fn with_document(
        self,
        id: &str,
        title: &str,
        space_id: &str,
        raw_body: &str,
    ) -> Self {
        let document = SourceDocument {
            id: DocumentId::from(id),
            title: title.to_string(),
            space_id: SpaceId::from(space_id),
            raw_body: raw_body.to_string(),
        };
        self.documents
            .lock()
            .unwrap()
            .insert(document.id.clone(), document);
        self
    }

    /// Make every `create_document` call fail with `error`
    pub fn failing_creates(mut self, error: StoreError) -> Self {
        self.create_failure = Some(error);
        self
    }

    /// Every document created so far, in creation order
    pub fn created(&self) -> Vec<(DocumentId, NewDocument)> {
        self.created.lock().unwrap().clone()
    }

    /// Number of `create_document` calls that succeeded
    pub fn create_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    type Error = StoreError;

    async fn fetch_document(&self, id: &DocumentId) -> Result<SourceDocument, Self::Error> {
        self.documents
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create_document(&self, document: NewDocument) -> Result<DocumentId, Self::Error> {
        if let Some(error) = &self.create_failure {
            return Err(error.clone());
        }

        let raw_body = document.body.to_json_string().map_err(|e| {
            StoreError::Serialization(format!("Failed to serialize document body: {}", e))
        })?;

        let mut documents = self.documents.lock().unwrap();
        let mut created = self.created.lock().unwrap();

        let id = DocumentId::new(format!("mem-{}", documents.len() + created.len() + 1));
        documents.insert(
            id.clone(),
            SourceDocument {
                id: id.clone(),
                title: document.title.clone(),
                space_id: document.space_id.clone(),
                raw_body,
            },
        );
        created.push((id.clone(), document));
        Ok(id)
    }
}
