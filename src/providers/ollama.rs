//! Ollama chat API client.
//!
//! Speaks `POST /api/chat` directly over `reqwest`. The response is handed
//! back undigested so the retry loop can decide what counts as a usable
//! answer.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ModelConfig;

use super::{ChatRequest, ChatTransport, ProviderError};

/// Time allowed to establish the TCP connection to the server.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum length of an error body kept in [`ProviderError::Api`].
const ERROR_BODY_PREVIEW_LEN: usize = 2000;

/// Client for a local Ollama server.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaProvider {
    /// Create a client for the server described by `config`.
    pub fn new(config: &ModelConfig) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Unreachable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatTransport for OllamaProvider {
    async fn chat(&self, request: &ChatRequest<'_>) -> Result<serde_json::Value, ProviderError> {
        let url = self.chat_url();
        tracing::debug!(model = request.model, messages = request.messages.len(), "POST {url}");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Unreachable(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let end = body
                .char_indices()
                .nth(ERROR_BODY_PREVIEW_LEN)
                .map_or(body.len(), |(i, _)| i);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: body[..end].to_string(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}
