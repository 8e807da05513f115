//! ADF (Atlassian Document Format) table rendering of breakdown rows
//!
//! The tree is `doc -> table -> tableRow -> tableHeader | tableCell ->
//! paragraph -> text`. It serializes to the exact JSON shape the document
//! store expects in an `atlas_doc_format` body.

use crate::row::BreakdownRow;
use serde::{Deserialize, Serialize};

/// Fixed header labels, in column order
pub const HEADER_LABELS: [&str; 5] = ["Epic", "User Story", "AC", "Category", "Notes"];

/// ADF document format version
pub const ADF_VERSION: u32 = 1;

/// A node of the ADF tree.
///
/// Only the node types needed for a plain table are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AdfNode {
    /// Document root
    Doc {
        /// Format version
        version: u32,
        /// Top-level blocks
        content: Vec<AdfNode>,
    },
    /// Table block
    Table {
        /// Rows
        content: Vec<AdfNode>,
    },
    /// Table row
    TableRow {
        /// Header or data cells
        content: Vec<AdfNode>,
    },
    /// Header cell
    TableHeader {
        /// Paragraphs
        content: Vec<AdfNode>,
    },
    /// Data cell
    TableCell {
        /// Paragraphs
        content: Vec<AdfNode>,
    },
    /// Paragraph
    Paragraph {
        /// Inline text runs
        #[serde(default)]
        content: Vec<AdfNode>,
    },
    /// Inline text run
    Text {
        /// Text
        text: String,
    },
}

impl AdfNode {
    fn paragraph(text: &str) -> Self {
        // ADF rejects empty text runs, so an empty value is an empty paragraph
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![AdfNode::Text {
                text: text.to_string(),
            }]
        };
        AdfNode::Paragraph { content }
    }

    fn children(&self) -> &[AdfNode] {
        match self {
            AdfNode::Doc { content, .. }
            | AdfNode::Table { content }
            | AdfNode::TableRow { content }
            | AdfNode::TableHeader { content }
            | AdfNode::TableCell { content }
            | AdfNode::Paragraph { content } => content,
            AdfNode::Text { .. } => &[],
        }
    }

    /// Concatenated text of every run below this node, paragraphs joined by
    /// newlines
    fn plain_text(&self) -> String {
        match self {
            AdfNode::Text { text } => text.clone(),
            AdfNode::Paragraph { content } => content.iter().map(AdfNode::plain_text).collect(),
            other => other
                .children()
                .iter()
                .map(AdfNode::plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A breakdown rendered as an ADF table: a fixed header row followed by one
/// data row per [`BreakdownRow`], in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableDocument {
    root: AdfNode,
}

impl TableDocument {
    /// Render rows into a table document.
    ///
    /// Deterministic and order preserving. No sorting, no deduplication.
    pub fn from_rows(rows: &[BreakdownRow]) -> Self {
        let header = AdfNode::TableRow {
            content: HEADER_LABELS
                .iter()
                .map(|label| AdfNode::TableHeader {
                    content: vec![AdfNode::paragraph(label)],
                })
                .collect(),
        };

        let data = rows.iter().map(|row| AdfNode::TableRow {
            content: row
                .cells()
                .iter()
                .map(|cell| AdfNode::TableCell {
                    content: vec![AdfNode::paragraph(cell)],
                })
                .collect(),
        });

        let table = AdfNode::Table {
            content: std::iter::once(header).chain(data).collect(),
        };

        Self {
            root: AdfNode::Doc {
                version: ADF_VERSION,
                content: vec![table],
            },
        }
    }

    /// The document root node
    pub fn root(&self) -> &AdfNode {
        &self.root
    }

    fn table_rows(&self) -> &[AdfNode] {
        self.root
            .children()
            .iter()
            .find(|node| matches!(node, AdfNode::Table { .. }))
            .map(AdfNode::children)
            .unwrap_or(&[])
    }

    /// Cell texts of every row, header first
    pub fn row_texts(&self) -> Vec<Vec<String>> {
        self.table_rows()
            .iter()
            .map(|row| row.children().iter().map(AdfNode::plain_text).collect())
            .collect()
    }

    /// Cell texts of the header row
    pub fn header_texts(&self) -> Vec<String> {
        self.row_texts().into_iter().next().unwrap_or_default()
    }

    /// Cell texts of the data rows only
    pub fn data_rows(&self) -> Vec<Vec<String>> {
        self.row_texts().into_iter().skip(1).collect()
    }

    /// Number of data rows (header excluded)
    pub fn data_row_count(&self) -> usize {
        self.table_rows().len().saturating_sub(1)
    }

    /// Serialize to a compact ADF JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
