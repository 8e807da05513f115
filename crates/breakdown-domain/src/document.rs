//! Document identifiers and the payloads exchanged with the document store

use crate::table::TableDocument;
use std::fmt;

/// Identifier of a document in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of the space (container) a document lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpaceId(String);

impl SpaceId {
    /// Create an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpaceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A document as fetched from the store, body still in storage markup
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Document identifier
    pub id: DocumentId,
    /// Document title
    pub title: String,
    /// Space the document belongs to
    pub space_id: SpaceId,
    /// Body in the store's markup representation
    pub raw_body: String,
}

/// A document to be created in the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    /// Title of the new document
    pub title: String,
    /// Space to create it in
    pub space_id: SpaceId,
    /// Table body
    pub body: TableDocument,
}

impl NewDocument {
    /// Title prefix for generated breakdown documents
    pub const TITLE_PREFIX: &'static str = "Breakdown of ";

    /// Build the breakdown document for a source title
    pub fn breakdown_of(source_title: &str, space_id: SpaceId, body: TableDocument) -> Self {
        Self {
            title: format!("{}{}", Self::TITLE_PREFIX, source_title),
            space_id,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_title_convention() {
        let doc = NewDocument::breakdown_of(
            "Login Flow",
            SpaceId::from("42"),
            TableDocument::from_rows(&[]),
        );
        assert_eq!(doc.title, "Breakdown of Login Flow");
        assert_eq!(doc.space_id.as_str(), "42");
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(DocumentId::from("66354").to_string(), "66354");
        assert_eq!(SpaceId::new("S1").to_string(), "S1");
    }
}
