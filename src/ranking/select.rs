use crate::embedding::EmbeddingClient;
use crate::similarity::{dot, matvec};

use super::RankingError;

/// Weight of corpus centrality in the greedy score.
const RELEVANCE_WEIGHT: f32 = 0.3;
/// Weight of dissimilarity from already-selected chunks.
const DIVERSITY_WEIGHT: f32 = 0.7;

/// Chunks chosen to represent a whole document, in selection order.
#[derive(Debug, Clone)]
pub struct SelectedChunks {
    /// Selected chunks, in the order they were chosen.
    pub chunks: Vec<String>,
    /// True when selection degraded to the input-order fallback.
    pub fallback: bool,
}

/// Pick `min(count, chunks.len())` chunks that jointly cover the document.
///
/// A greedy maximal-marginal-relevance pass: the opening chunk seeds the
/// selection unconditionally (it usually carries the document's framing), and
/// each following pick maximizes a blend of corpus centrality and distance
/// from everything chosen so far, with diversity weighted more heavily.
///
/// Selection never fails: on any embedding error the first `count` chunks are
/// returned in input order and the result is tagged as a fallback.
pub async fn select_representative(
    embedder: &dyn EmbeddingClient,
    chunks: &[String],
    count: usize,
) -> SelectedChunks {
    match try_select(embedder, chunks, count).await {
        Ok(selected) => SelectedChunks {
            chunks: selected,
            fallback: false,
        },
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Representative selection failed; returning chunks in input order"
            );
            let take = count.min(chunks.len());
            SelectedChunks {
                chunks: chunks[..take].to_vec(),
                fallback: true,
            }
        }
    }
}

async fn try_select(
    embedder: &dyn EmbeddingClient,
    chunks: &[String],
    count: usize,
) -> Result<Vec<String>, RankingError> {
    if chunks.is_empty() {
        return Ok(Vec::new());
    }

    let embeddings = embedder.generate_embeddings(chunks.to_vec()).await?;
    if embeddings.len() != chunks.len() {
        return Err(RankingError::CountMismatch {
            expected: chunks.len(),
            actual: embeddings.len(),
        });
    }

    let target = count.min(chunks.len());
    let mut selected = vec![0_usize];

    while selected.len() < target {
        let mut best_index: Option<usize> = None;
        let mut best_score = f32::NEG_INFINITY;

        for candidate in 0..chunks.len() {
            if selected.contains(&candidate) {
                continue;
            }

            // Centrality: average similarity to the whole corpus. The
            // candidate's own self-similarity of 1.0 is part of the mean, a
            // constant offset shared by every candidate.
            let relevance = matvec(&embeddings, &embeddings[candidate])
                .iter()
                .sum::<f32>()
                / embeddings.len() as f32;

            // Most negative = most different from everything chosen so far.
            let diversity = -selected
                .iter()
                .map(|&chosen| dot(&embeddings[chosen], &embeddings[candidate]))
                .fold(f32::NEG_INFINITY, f32::max);

            let score = RELEVANCE_WEIGHT * relevance + DIVERSITY_WEIGHT * diversity;
            // Strict comparison keeps the earliest candidate on ties.
            if score > best_score {
                best_score = score;
                best_index = Some(candidate);
            }
        }

        match best_index {
            Some(index) => selected.push(index),
            None => break,
        }
    }

    Ok(selected
        .into_iter()
        .map(|index| chunks[index].clone())
        .collect())
}
