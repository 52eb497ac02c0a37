//! Chunk selection over embeddings: relevance ranking and representative
//! subset selection.
//!
//! Both operations are degradable by design. A document summary built from
//! chunks in their original order is still useful, so embedding failures are
//! logged and masked by a deterministic input-order fallback instead of
//! surfacing to the caller. Results carry a `fallback` tag so callers and
//! tests can observe which path produced them.

mod rank;
mod select;

pub use rank::{RankedChunks, rank_chunks};
pub use select::{SelectedChunks, select_representative};

use crate::embedding::EmbeddingClientError;
use thiserror::Error;

/// Internal failures that trigger the input-order fallback.
#[derive(Debug, Error)]
pub(crate) enum RankingError {
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    #[error("embedding provider returned no vector for the query")]
    MissingQueryEmbedding,
    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch {
        expected: usize,
        actual: usize,
    },
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::embedding::{EmbeddingClient, EmbeddingClientError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Embedding stub mapping exact texts to fixed vectors.
    ///
    /// Unknown texts produce an error, which doubles as a guard that the code
    /// under test embeds exactly the strings the test registered.
    pub(crate) struct StubEmbedder {
        vectors: Vec<(String, Vec<f32>)>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl StubEmbedder {
        pub(crate) fn new(vectors: Vec<(&str, Vec<f32>)>) -> Self {
            Self {
                vectors: vectors
                    .into_iter()
                    .map(|(text, vector)| (text.to_string(), vector))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn recorded_calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl EmbeddingClient for StubEmbedder {
        async fn generate_embeddings(
            &self,
            texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
            self.calls.lock().expect("calls lock").push(texts.clone());
            texts
                .iter()
                .map(|text| {
                    self.vectors
                        .iter()
                        .find(|(known, _)| known == text)
                        .map(|(_, vector)| vector.clone())
                        .ok_or_else(|| {
                            EmbeddingClientError::GenerationFailed(format!(
                                "no stub vector registered for {text:?}"
                            ))
                        })
                })
                .collect()
        }
    }

    /// Embedding stub that always fails.
    pub(crate) struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingClient for FailingEmbedder {
        async fn generate_embeddings(
            &self,
            _texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
            Err(EmbeddingClientError::ProviderUnavailable(
                "stubbed outage".to_string(),
            ))
        }
    }
}
