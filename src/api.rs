//! HTTP surface for ragsum.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /generate-embeddings` – Embed a list of texts and return one unit-norm
//!   vector per input.
//! - `POST /summarize` – Rank the supplied chunks against a query and return a
//!   query-focused summary together with the ranked chunks and their scores.
//! - `POST /initial-summary` – Select representative chunks from a document and
//!   return an overview summary plus a key-topic list.
//! - `GET /` – Liveness check returning a static confirmation message.
//! - `GET /metrics` – Observe serving counters, including degraded-ranking counts.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Handlers are generic over [`SummaryApi`] so tests can substitute a stub
//! service without process-wide mutation.

use crate::summary::{SummaryApi, SummaryError};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummaryApi + 'static,
{
    Router::new()
        .route("/", get(health))
        .route("/generate-embeddings", post(generate_embeddings::<S>))
        .route("/summarize", post(summarize::<S>))
        .route("/initial-summary", post(initial_summary::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_top_k() -> usize {
    3
}

fn default_chunk_count() -> usize {
    5
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "ragsum summarization service is running" }))
}

/// Request body for the `POST /generate-embeddings` endpoint.
#[derive(Deserialize)]
struct EmbeddingsRequest {
    /// Texts to embed, one vector returned per entry.
    texts: Vec<String>,
}

/// Success response for the `POST /generate-embeddings` endpoint.
#[derive(Serialize)]
struct EmbeddingsResponse {
    /// Unit-norm embedding per input text, in input order.
    embeddings: Vec<Vec<f32>>,
}

/// Embed caller-supplied texts.
async fn generate_embeddings<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<EmbeddingsRequest>,
) -> Result<Json<EmbeddingsResponse>, AppError>
where
    S: SummaryApi,
{
    let embeddings = service.generate_embeddings(request.texts).await?;
    tracing::info!(count = embeddings.len(), "Embeddings request completed");
    Ok(Json(EmbeddingsResponse { embeddings }))
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Question the summary must address.
    query: String,
    /// Candidate chunks to rank and summarize.
    chunks: Vec<String>,
    /// Output token budget for the generated summary (defaults to 1024).
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    /// Number of top-ranked chunks fed to the generator (defaults to 3).
    #[serde(default = "default_top_k")]
    top_k: usize,
}

/// Success response for the `POST /summarize` endpoint.
#[derive(Serialize)]
struct SummarizeResponse {
    /// Generated query-focused summary.
    summary: String,
    /// Chunks that informed the summary, most relevant first.
    ranked_chunks: Vec<String>,
    /// Similarity score per ranked chunk.
    chunk_scores: Vec<f32>,
}

/// Rank chunks against a query and summarize the most relevant ones.
async fn summarize<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummaryApi,
{
    ensure_positive(request.max_tokens as usize, "max_tokens")?;
    ensure_positive(request.top_k, "top_k")?;

    let outcome = service
        .summarize(
            request.query,
            request.chunks,
            request.max_tokens,
            request.top_k,
        )
        .await?;
    Ok(Json(SummarizeResponse {
        summary: outcome.summary,
        ranked_chunks: outcome.ranked_chunks,
        chunk_scores: outcome.chunk_scores,
    }))
}

/// Request body for the `POST /initial-summary` endpoint.
#[derive(Deserialize)]
struct InitialSummaryRequest {
    /// Document chunks, in document order.
    chunks: Vec<String>,
    /// Output token budget for the overview (defaults to 1024).
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    /// Number of representative chunks to select (defaults to 5).
    #[serde(default = "default_chunk_count")]
    chunk_count: usize,
}

/// Success response for the `POST /initial-summary` endpoint.
#[derive(Serialize)]
struct InitialSummaryResponse {
    /// Generated document overview.
    overview_summary: String,
    /// Key topics extracted from the overview.
    key_topics: Vec<String>,
    /// Representative chunks the overview was built from.
    selected_chunks: Vec<String>,
}

/// Produce a first-look overview and topic list for a document.
async fn initial_summary<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<InitialSummaryRequest>,
) -> Result<Json<InitialSummaryResponse>, AppError>
where
    S: SummaryApi,
{
    ensure_positive(request.max_tokens as usize, "max_tokens")?;
    ensure_positive(request.chunk_count, "chunk_count")?;

    let outcome = service
        .initial_summary(request.chunks, request.max_tokens, request.chunk_count)
        .await?;
    Ok(Json(InitialSummaryResponse {
        overview_summary: outcome.overview_summary,
        key_topics: outcome.key_topics,
        selected_chunks: outcome.selected_chunks,
    }))
}

/// Return a concise metrics snapshot with serving counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: SummaryApi,
{
    let snapshot = service.metrics_snapshot();
    Json(MetricsResponse {
        embeddings_served: snapshot.embeddings_served,
        summaries_generated: snapshot.summaries_generated,
        overviews_generated: snapshot.overviews_generated,
        ranking_fallbacks: snapshot.ranking_fallbacks,
        selection_fallbacks: snapshot.selection_fallbacks,
    })
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    embeddings_served: u64,
    summaries_generated: u64,
    overviews_generated: u64,
    ranking_fallbacks: u64,
    selection_fallbacks: u64,
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "generate_embeddings",
                method: "POST",
                path: "/generate-embeddings",
                description: "Embed a list of texts. Response returns { \"embeddings\": [[number]] } with one unit-norm vector per input.",
                request_example: Some(json!({
                    "texts": ["First passage", "Second passage"]
                })),
            },
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Rank chunks against a query and return a focused summary plus the ranked chunks and their similarity scores.",
                request_example: Some(json!({
                    "query": "What is the refund policy?",
                    "chunks": ["Chunk one", "Chunk two"],
                    "max_tokens": 1024,
                    "top_k": 3
                })),
            },
            CommandDescriptor {
                name: "initial_summary",
                method: "POST",
                path: "/initial-summary",
                description: "Select representative chunks from a document and return an overview summary with a key-topic list.",
                request_example: Some(json!({
                    "chunks": ["Chunk one", "Chunk two"],
                    "max_tokens": 1024,
                    "chunk_count": 5
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return serving counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

/// Error wrapper translating failures into HTTP responses.
enum AppError {
    /// Request parameters failed boundary validation.
    BadRequest(String),
    /// Service-layer failure surfaced as a server error.
    Service(SummaryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Service(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
            }
        }
    }
}

impl From<SummaryError> for AppError {
    fn from(inner: SummaryError) -> Self {
        Self::Service(inner)
    }
}

fn ensure_positive(value: usize, field: &str) -> Result<(), AppError> {
    if value == 0 {
        return Err(AppError::BadRequest(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(())
}
