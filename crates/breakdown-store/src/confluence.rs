//! Confluence Cloud Document Store
//!
//! Reads pages in storage (XHTML) representation and creates pages whose
//! body is an ADF document, using the v2 REST API.
//!
//! - `GET  /wiki/api/v2/pages/{id}?body-format=storage`
//! - `POST /wiki/api/v2/pages`

use crate::config::ConfluenceConfig;
use crate::StoreError;
use async_trait::async_trait;
use breakdown_domain::traits::DocumentStore;
use breakdown_domain::{DocumentId, NewDocument, SourceDocument, SpaceId};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Confluence page store
pub struct ConfluenceStore {
    config: ConfluenceConfig,
    client: reqwest::Client,
    base_url: Url,
}

/// Page as returned by `GET /pages/{id}?body-format=storage`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    id: String,
    title: String,
    space_id: String,
    #[serde(default)]
    body: Option<PageBody>,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    storage: Option<StorageBody>,
}

#[derive(Debug, Deserialize)]
struct StorageBody {
    value: Option<String>,
}

/// Request body for `POST /pages`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePageRequest<'a> {
    space_id: &'a str,
    status: &'static str,
    title: &'a str,
    body: CreatePageBody,
}

#[derive(Debug, Serialize)]
struct CreatePageBody {
    representation: &'static str,
    /// ADF JSON, serialized to a string
    value: String,
}

#[derive(Debug, Deserialize)]
struct CreatePageResponse {
    id: String,
}

impl ConfluenceStore {
    /// Create a store from validated configuration
    pub fn new(config: ConfluenceConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(&format!(
            "{}/wiki/api/v2",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|e| StoreError::Config(format!("Invalid base URL: {}", e)))?;

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// `{base}/pages/{segments..}`, each segment percent-encoded so ids
    /// cannot leave the `/pages` collection
    fn pages_url(&self, id: Option<&DocumentId>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Config("Base URL cannot hold a path".to_string()))?;
            segments.push("pages");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    fn transport_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.config.timeout())
        } else {
            StoreError::Upstream {
                status: None,
                message: format!("Request failed: {}", e),
                body: String::new(),
            }
        }
    }

    /// Send a request and return the success body, classifying failures
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, StoreError> {
        let response = request
            .basic_auth(&self.config.email, Some(self.config.api_token()))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read error body: {}>", e));
            error!(status = status.as_u16(), body = %body, "Document store returned an error");
            return Err(StoreError::Upstream {
                status: Some(status.as_u16()),
                message: format!("HTTP {}", status.as_u16()),
                body,
            });
        }

        response.text().await.map_err(|e| self.transport_error(e))
    }
}

#[async_trait]
impl DocumentStore for ConfluenceStore {
    type Error = StoreError;

    async fn fetch_document(&self, id: &DocumentId) -> Result<SourceDocument, Self::Error> {
        // Dot segments are dropped by the URL builder, which would address
        // the collection itself
        if matches!(id.as_str().trim(), "" | "." | "..") {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let url = self.pages_url(Some(id))?;
        debug!(page_id = %id, "Fetching page");

        let request = self.client.get(url).query(&[("body-format", "storage")]);
        let body = match self.execute(request).await {
            Err(StoreError::Upstream {
                status: Some(status),
                ..
            }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            other => other?,
        };

        let page: PageResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::MalformedResponse(format!("Failed to parse page: {}", e)))?;

        let raw_body = page
            .body
            .and_then(|b| b.storage)
            .and_then(|s| s.value)
            .unwrap_or_default();

        Ok(SourceDocument {
            id: DocumentId::new(page.id),
            title: page.title,
            space_id: SpaceId::new(page.space_id),
            raw_body,
        })
    }

    async fn create_document(&self, document: NewDocument) -> Result<DocumentId, Self::Error> {
        let value = document.body.to_json_string().map_err(|e| {
            StoreError::Serialization(format!("Failed to serialize document body: {}", e))
        })?;

        let payload = CreatePageRequest {
            space_id: document.space_id.as_str(),
            status: "current",
            title: &document.title,
            body: CreatePageBody {
                representation: "atlas_doc_format",
                value,
            },
        };

        let url = self.pages_url(None)?;
        let body = self.execute(self.client.post(url).json(&payload)).await?;

        let created: CreatePageResponse = serde_json::from_str(&body).map_err(|e| {
            StoreError::MalformedResponse(format!("Failed to parse created page: {}", e))
        })?;

        info!(page_id = %created.id, title = %document.title, "Created page");
        Ok(DocumentId::new(created.id))
    }
}
