//! Outcome types and error definitions for the summarization pipeline.

use crate::embedding::EmbeddingClientError;
use crate::generation::GenerationClientError;
use thiserror::Error;

/// Errors emitted by the summarization service.
///
/// Ranking and selection failures never appear here; those paths degrade to
/// an input-order fallback inside the ranking module.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Embedding provider failed while serving a direct embedding request.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Generative backend failed to produce a completion.
    #[error("Failed to generate summary: {0}")]
    Generation(#[from] GenerationClientError),
}

/// Result of a query-focused summarization.
#[derive(Debug, Clone)]
pub struct SummarizeOutcome {
    /// Generated summary text.
    pub summary: String,
    /// Chunks that informed the summary, most relevant first.
    pub ranked_chunks: Vec<String>,
    /// Similarity score for each ranked chunk, co-indexed with `ranked_chunks`.
    pub chunk_scores: Vec<f32>,
}

/// Result of a whole-document overview.
#[derive(Debug, Clone)]
pub struct OverviewOutcome {
    /// Generated overview text.
    pub overview_summary: String,
    /// Key topics extracted from the overview, one entry per topic.
    pub key_topics: Vec<String>,
    /// Representative chunks the overview was built from, in selection order.
    pub selected_chunks: Vec<String>,
}
