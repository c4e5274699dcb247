//! Brace extraction for free-text model answers.
//!
//! Models asked for JSON often wrap it in prose ("Sure! Here is ...").
//! [`parse_json_from_response`] grabs the widest `{ ... }` span and decodes
//! it strictly; there is no partial recovery.

use std::sync::LazyLock;

use thiserror::Error;

use crate::models::ParsedReview;

/// Maximum length of response text echoed into debug logs.
const LOG_PREVIEW_LEN: usize = 500;

/// Errors from brace extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON found in response")]
    NoJson,

    #[error("invalid JSON in response: {0}")]
    InvalidJson(String),
}

/// First `{` through the last `}` in the whole string, across newlines.
static BRACE_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"(?s)\{.*\}").expect("brace pattern is valid"));

/// Extract and decode the brace-delimited JSON object embedded in `response`.
///
/// The match is greedy, so two separate objects in one string are captured
/// as a single span (and usually fail to decode).
pub fn parse_json_from_response(response: &str) -> Result<ParsedReview, ParseError> {
    let Some(span) = BRACE_RE.find(response) else {
        tracing::warn!("no JSON object found in model response");
        tracing::debug!("response without JSON: {}", preview(response));
        return Err(ParseError::NoJson);
    };

    serde_json::from_str(span.as_str()).map_err(|e| {
        tracing::warn!("invalid JSON in model response: {e}");
        tracing::debug!("undecodable span: {}", preview(span.as_str()));
        ParseError::InvalidJson(e.to_string())
    })
}

/// Truncate `text` on a char boundary for logging.
fn preview(text: &str) -> &str {
    match text.char_indices().nth(LOG_PREVIEW_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
