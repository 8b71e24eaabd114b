//! Locates and parses the JSON object embedded in a model's free-text reply.
//!
//! Models wrap the object in prose or markdown fences despite being told not to, so the
//! reply is scanned with a greedy `{.*}` match: the candidate runs from the first `{` to
//! the last `}` in the whole text, newlines included. Nested or trailing objects are never
//! split out; if that outermost span is not valid JSON, extraction fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::ExtractError;

static OUTERMOST_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Return the outermost `{...}` span of `text`, if any.
pub fn outermost_object_span(text: &str) -> Option<&str> {
    OUTERMOST_OBJECT.find(text).map(|m| m.as_str())
}

/// Extract the outermost `{...}` span of `text` and deserialize it into `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let span = outermost_object_span(text).ok_or(ExtractError::NoObject)?;
    Ok(serde_json::from_str(span)?)
}
