//! Parse model replies into breakdown rows and render them as a table

use crate::error::PipelineError;
use breakdown_domain::{BreakdownRow, CompletionReply, TableDocument};
use serde_json::Value;
use tracing::debug;

/// Rows parsed from a reply together with their table rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBreakdown {
    /// Rows in reply order
    pub rows: Vec<BreakdownRow>,
    /// Table rendering of `rows`
    pub table: TableDocument,
}

/// Parse a reply and render it as a table document.
///
/// Pure: no I/O, same reply in, same table out.
pub fn parse_and_serialize(reply: &CompletionReply) -> Result<ParsedBreakdown, PipelineError> {
    let rows = parse_rows(reply)?;
    let table = TableDocument::from_rows(&rows);
    Ok(ParsedBreakdown { rows, table })
}

/// Parse a reply into rows.
///
/// The reply must be a JSON array of objects, optionally wrapped in a
/// markdown code fence. Objects missing any of the five keys still produce
/// a row, with the missing values empty.
///
/// # Errors
///
/// [`PipelineError::InvalidModelOutput`] carrying the raw reply when the
/// reply is not JSON, not an array, or contains a non-object element.
pub fn parse_rows(reply: &CompletionReply) -> Result<Vec<BreakdownRow>, PipelineError> {
    let raw = reply.as_str();
    let json_str = strip_code_fence(raw);

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| PipelineError::invalid_output(format!("not valid JSON: {}", e), raw))?;

    let elements = match json {
        Value::Array(elements) => elements,
        other => {
            return Err(PipelineError::invalid_output(
                format!("expected a JSON array, found {}", json_type(&other)),
                raw,
            ))
        }
    };

    let mut rows = Vec::with_capacity(elements.len());
    for (idx, element) in elements.into_iter().enumerate() {
        if !element.is_object() {
            return Err(PipelineError::invalid_output(
                format!("element {} is {}, expected an object", idx, json_type(&element)),
                raw,
            ));
        }
        let row: BreakdownRow = serde_json::from_value(element).map_err(|e| {
            PipelineError::invalid_output(format!("element {}: {}", idx, e), raw)
        })?;
        rows.push(row);
    }

    debug!(rows = rows.len(), "Parsed breakdown rows");
    Ok(rows)
}

/// Drop a surrounding ```json ... ``` fence if there is one
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Skip the opening fence line (```json or ```)
    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => "",
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
