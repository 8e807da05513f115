//! Source extraction: fetch a document and strip its markup

use crate::error::PipelineError;
use breakdown_domain::traits::DocumentStore;
use breakdown_domain::{DocumentId, RequirementText, SpaceId};
use breakdown_store::StoreError;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Anything from `<` up to and including the next `>`, or to the end of the
/// text when unterminated
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("tag pattern is valid"));

/// Title, space and plain requirement text of a source document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSource {
    /// Source document identifier
    pub id: DocumentId,
    /// Source document title
    pub title: String,
    /// Space the source lives in; the breakdown is created there too
    pub space_id: SpaceId,
    /// Markup-free body
    pub requirement_text: RequirementText,
}

/// Remove every markup tag from `body`.
///
/// Entities such as `&amp;` are left as they are and whitespace is not
/// normalised. The result never contains `<`.
pub fn strip_markup(body: &str) -> RequirementText {
    RequirementText::new(TAG_PATTERN.replace_all(body, ""))
}

/// Fetch `id` from the store and recover its requirement text.
///
/// # Errors
///
/// - [`PipelineError::NotFound`] when the store has no such document
/// - [`PipelineError::EmptyContent`] when nothing but whitespace survives
///   tag removal
/// - upstream errors from the store otherwise
pub async fn extract<S>(store: &S, id: &DocumentId) -> Result<ExtractedSource, PipelineError>
where
    S: DocumentStore<Error = StoreError> + ?Sized,
{
    let document = store
        .fetch_document(id)
        .await
        .map_err(PipelineError::from_fetch)?;

    let requirement_text = strip_markup(&document.raw_body);

    debug!(
        document_id = %id,
        raw_chars = document.raw_body.len(),
        text_chars = requirement_text.len(),
        "Stripped markup from source document"
    );

    if requirement_text.is_blank() {
        return Err(PipelineError::EmptyContent(id.to_string()));
    }

    Ok(ExtractedSource {
        id: document.id,
        title: document.title,
        space_id: document.space_id,
        requirement_text,
    })
}
