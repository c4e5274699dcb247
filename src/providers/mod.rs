//! Chat transport trait and model-server integration.
//!
//! Decouples the retry loop in [`crate::chat`] from the HTTP details of
//! the model server, so tests can substitute a scripted transport.

pub mod ollama;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::ChatMessage;

/// Output format requested from the model server.
pub const JSON_FORMAT: &str = "json";

/// Errors from the transport. All of them are fatal to the retry loop.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("model server unreachable: {0}")]
    Unreachable(String),

    #[error("model server returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model server sent an unreadable response: {0}")]
    InvalidResponse(String),
}

/// One chat request, in the model server's wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub format: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// Build a non-streaming request that asks for JSON output.
    pub fn json(model: &'a str, messages: &'a [ChatMessage]) -> Self {
        Self {
            model,
            messages,
            stream: false,
            format: JSON_FORMAT,
        }
    }
}

/// Sends one chat request and returns the raw response object.
///
/// Implementations must not interpret the response body beyond decoding it
/// as JSON; locating `message.content` is the caller's job.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn chat(&self, request: &ChatRequest<'_>) -> Result<serde_json::Value, ProviderError>;
}
