//! Plain requirement text recovered from a source document

use std::fmt;

/// Markup-free requirement prose.
///
/// Produced by the source extractor after tag removal. May be empty; the
/// pipeline decides whether an empty requirement is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequirementText(String);

impl RequirementText {
    /// Wrap already-sanitized text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrow the text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the text is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the text has no bytes at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RequirementText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequirementText {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RequirementText {
    fn from(s: String) -> Self {
        Self(s)
    }
}
