//! The breakdown row record produced from model output

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One line of the breakdown: an epic, a user story under it, its acceptance
/// criteria, a free-form category and reviewer notes.
///
/// Deserialization is lenient. Missing fields become empty strings, `null`
/// becomes an empty string, arrays are joined with newlines and other scalars
/// keep their JSON text. The model is not reliable enough to reject partial
/// rows, and a partial row is still useful to a reviewer.
///
/// `story` and `ac` also accept the spellings in [`STORY_KEYS`] and
/// [`AC_KEYS`]. The first key present wins, so the canonical key always
/// beats an alternate spelling in the same object. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BreakdownRow {
    /// Epic title
    pub epic: String,

    /// User story text
    pub story: String,

    /// Acceptance criteria
    pub ac: String,

    /// Category (e.g. "security", "ux")
    pub category: String,

    /// Reviewer notes
    pub notes: String,
}

/// Keys read for `story`, in priority order
pub const STORY_KEYS: [&str; 2] = ["story", "user_story"];

/// Keys read for `ac`, in priority order
pub const AC_KEYS: [&str; 3] = ["ac", "acceptance_criteria", "acceptanceCriteria"];

impl BreakdownRow {
    /// Create a row from its five values
    pub fn new(
        epic: impl Into<String>,
        story: impl Into<String>,
        ac: impl Into<String>,
        category: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            epic: epic.into(),
            story: story.into(),
            ac: ac.into(),
            category: category.into(),
            notes: notes.into(),
        }
    }

    /// The five cell values in table column order
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.epic,
            &self.story,
            &self.ac,
            &self.category,
            &self.notes,
        ]
    }
}

impl<'de> Deserialize<'de> for BreakdownRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            epic: field_text(&object, &["epic"]),
            story: field_text(&object, &STORY_KEYS),
            ac: field_text(&object, &AC_KEYS),
            category: field_text(&object, &["category"]),
            notes: field_text(&object, &["notes"]),
        })
    }
}

/// Text of the first key in `keys` present in `object`, empty when none is
fn field_text(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| object.get(*key))
        .map(value_to_text)
        .unwrap_or_default()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
