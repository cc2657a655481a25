//! Post-processing of generated SQL text.

use crate::error::LlmError;
use crate::prompt::CANNOT_ANSWER_SENTINEL;

/// Message returned to the client when the model declines a question.
pub const REJECTION_MESSAGE: &str =
    "The question could not be answered based on the available database schema.";

const SQL_FENCE_OPEN: &str = "```sql";
const FENCE_CLOSE: &str = "```";

/// Substring check for the "cannot answer" sentinel.
///
/// A reply that merely quotes the sentinel is also treated as a rejection.
pub fn is_semantic_rejection(text: &str) -> bool {
    text.contains(CANNOT_ANSWER_SENTINEL)
}

/// Remove a leading "```sql" and a trailing "```", then trim.
///
/// Only exact prefix/suffix matches are removed. The function runs to a
/// fixed point, so `strip_code_fences(strip_code_fences(x)) == strip_code_fences(x)`.
pub fn strip_code_fences(text: &str) -> String {
    let mut current = text.trim();
    loop {
        let mut next = current;
        if let Some(rest) = next.strip_prefix(SQL_FENCE_OPEN) {
            next = rest;
        }
        if let Some(rest) = next.strip_suffix(FENCE_CLOSE) {
            next = rest;
        }
        let next = next.trim();
        if next.len() == current.len() {
            return current.to_string();
        }
        current = next;
    }
}

/// Turn raw provider output into the SQL handed back to the caller.
pub fn postprocess_generated_sql(raw: &str) -> Result<String, LlmError> {
    if is_semantic_rejection(raw) {
        return Err(LlmError::SemanticRejection(REJECTION_MESSAGE.to_string()));
    }
    Ok(strip_code_fences(raw))
}
