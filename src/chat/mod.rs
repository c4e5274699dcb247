//! JSON-coercing chat loop.
//!
//! Local models asked for JSON mostly comply, but not always: the content
//! field can be missing, wrapped in prose, or truncated. [`ChatClient`]
//! re-asks until something decodes or the retry budget runs out.
//!
//! Only bad *output* consumes a retry. A transport failure (server down,
//! HTTP error status, unreadable body) is returned immediately as
//! [`ChatError::Provider`].

use std::sync::Arc;

use thiserror::Error;

use crate::config::ModelConfig;
use crate::models::{ChatMessage, ParsedReview};
use crate::parser::{self, ParseError};
use crate::providers::{ChatRequest, ChatTransport, ProviderError};

/// Errors from [`ChatClient::chat`].
#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("model could not generate valid JSON after {attempts} attempt(s)")]
    Exhausted { attempts: u32 },
}

/// Why a single attempt produced nothing usable. Always retried.
#[derive(Error, Debug)]
enum BadOutput {
    #[error("no 'message.content' field in the response")]
    MissingContent,

    #[error(transparent)]
    Unparseable(#[from] ParseError),
}

/// Chat client bound to one model and transport.
#[derive(Clone)]
pub struct ChatClient {
    transport: Arc<dyn ChatTransport>,
    model: ModelConfig,
    system_prompt: String,
}

impl ChatClient {
    /// Create a client.
    ///
    /// `system_prompt` is used whenever [`chat`](Self::chat) is called
    /// without an explicit one.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        model: ModelConfig,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            model,
            system_prompt: system_prompt.into(),
        }
    }

    /// [`chat`](Self::chat) with the configured system prompt and retry budget.
    pub async fn chat_default(
        &self,
        messages: &mut Vec<ChatMessage>,
    ) -> Result<ParsedReview, ChatError> {
        self.chat(messages, None, self.model.try_outs).await
    }

    /// Ask the model for a JSON answer, retrying up to `try_outs` extra times.
    ///
    /// A system message is appended to `messages` in place before the first
    /// request, so pass a fresh history per logical request. At most
    /// `try_outs + 1` requests are sent (saturating at `u32::MAX`); the
    /// first decodable answer wins.
    pub async fn chat(
        &self,
        messages: &mut Vec<ChatMessage>,
        system_prompt: Option<&str>,
        try_outs: u32,
    ) -> Result<ParsedReview, ChatError> {
        let system = system_prompt.unwrap_or(&self.system_prompt);
        messages.push(ChatMessage::system(system));

        let request = ChatRequest::json(&self.model.name, messages.as_slice());
        let max_attempts = try_outs.saturating_add(1);

        for attempt in 1..=max_attempts {
            let response = self.transport.chat(&request).await?;

            match decode_response(&response) {
                Ok(review) => {
                    tracing::debug!(attempt, "model returned valid JSON");
                    return Ok(review);
                }
                Err(e) => {
                    tracing::warn!(attempt, max = max_attempts, "unusable model output: {e}");
                    tracing::debug!("rejected response: {response}");
                }
            }
        }

        tracing::warn!("model couldn't generate JSON after {max_attempts} attempt(s)");
        Err(ChatError::Exhausted {
            attempts: max_attempts,
        })
    }
}

/// Pull `message.content` out of a raw response and decode it.
///
/// Tries the content verbatim first, then falls back to brace extraction.
fn decode_response(response: &serde_json::Value) -> Result<ParsedReview, BadOutput> {
    let content = response
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or(BadOutput::MissingContent)?;

    tracing::debug!("model response content: {content}");

    match serde_json::from_str::<ParsedReview>(content) {
        Ok(review) => Ok(review),
        Err(e) => {
            tracing::warn!("model content is not bare JSON ({e}), trying brace extraction");
            Ok(parser::parse_json_from_response(content)?)
        }
    }
}
