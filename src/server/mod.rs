//! HTTP front end.
//!
//! `POST /analyze_code` returns the text files of a repository,
//! `POST /review_code` runs the per-file model review over them and
//! `GET /health` reports liveness. Every failure after the request body is
//! accepted maps to HTTP 500 with `{"detail": "<message>"}`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::chat::{ChatClient, ChatError};
use crate::config::Config;
use crate::constants::VERSION;
use crate::fetcher::{FetchError, RepoFetcher};
use crate::models::{CodeSnapshot, ReviewReport};
use crate::providers::ProviderError;
use crate::providers::ollama::OllamaProvider;
use crate::review::Reviewer;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("server is shutting down")]
    ShuttingDown,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {self}");
        let body = serde_json::json!({ "detail": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Request body shared by both repository endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub github_url: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub code_summary: CodeSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review: ReviewReport,
}

/// Shared handler state.
pub struct AppState {
    fetcher: RepoFetcher,
    reviewer: Reviewer,
    clones: Semaphore,
}

impl AppState {
    pub fn new(fetcher: RepoFetcher, reviewer: Reviewer, max_concurrent_clones: usize) -> Self {
        Self {
            fetcher,
            reviewer,
            clones: Semaphore::new(max_concurrent_clones.max(1)),
        }
    }

    /// Build state talking to the Ollama server named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let transport = Arc::new(OllamaProvider::new(&config.model)?);
        let chat = ChatClient::new(
            transport,
            config.model.clone(),
            config.prompts.system_prompt.clone(),
        );
        Ok(Self::new(
            RepoFetcher::new(config.fetch.clone()),
            Reviewer::new(chat, &config.prompts),
            config.server.max_concurrent_clones,
        ))
    }

    /// Stop handing out clone permits. Requests still waiting for one
    /// fail with [`ServerError::ShuttingDown`].
    pub fn begin_shutdown(&self) {
        self.clones.close();
    }

    /// Fetch under the clone limit.
    async fn fetch(&self, url: &str) -> Result<CodeSnapshot, ServerError> {
        let _permit = self
            .clones
            .acquire()
            .await
            .map_err(|_| ServerError::ShuttingDown)?;
        Ok(self.fetcher.fetch(url).await?)
    }
}

/// Build the router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze_code", post(analyze_code))
        .route("/review_code", post(review_code))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve on `listener` until Ctrl-C.
pub async fn serve(config: &Config, listener: TcpListener) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let app = router(Arc::clone(&state));

    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            state.begin_shutdown();
        })
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
}

async fn analyze_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let code_summary = state.fetch(&request.github_url).await?;
    Ok(Json(AnalyzeResponse { code_summary }))
}

async fn review_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ReviewResponse>, ServerError> {
    let snapshot = state.fetch(&request.github_url).await?;
    let review = state
        .reviewer
        .review_snapshot(&request.github_url, &snapshot)
        .await?;
    Ok(Json(ReviewResponse { review }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}
