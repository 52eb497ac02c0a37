use std::cmp::Ordering;

use crate::embedding::EmbeddingClient;
use crate::similarity::matvec;

use super::RankingError;

/// Instruction prefix prepended to queries before embedding.
///
/// Retrieval-tuned embedding models expect queries framed as an instruction
/// while passages are embedded verbatim; the asymmetry is what makes the
/// query land near its answers in vector space.
const QUERY_INSTRUCTION: &str = "Represent this sentence for retrieving relevant passages: ";

/// Chunks ranked by semantic similarity to a query.
#[derive(Debug, Clone)]
pub struct RankedChunks {
    /// Top chunks, most similar first.
    pub chunks: Vec<String>,
    /// Similarity score for each returned chunk, co-indexed with `chunks`.
    pub scores: Vec<f32>,
    /// True when ranking degraded to the input-order fallback.
    pub fallback: bool,
}

/// Rank `chunks` by cosine similarity to `query` and keep the best
/// `min(top_k, chunks.len())`.
///
/// Ranking never fails: when the embedding provider errors, the first `top_k`
/// chunks are returned in input order with a placeholder score of `1.0` and
/// the result is tagged as a fallback.
pub async fn rank_chunks(
    embedder: &dyn EmbeddingClient,
    query: &str,
    chunks: &[String],
    top_k: usize,
) -> RankedChunks {
    match try_rank(embedder, query, chunks, top_k).await {
        Ok((ranked_chunks, scores)) => RankedChunks {
            chunks: ranked_chunks,
            scores,
            fallback: false,
        },
        Err(error) => {
            tracing::warn!(error = %error, "Chunk ranking failed; returning chunks in input order");
            let take = top_k.min(chunks.len());
            RankedChunks {
                chunks: chunks[..take].to_vec(),
                scores: vec![1.0; take],
                fallback: true,
            }
        }
    }
}

async fn try_rank(
    embedder: &dyn EmbeddingClient,
    query: &str,
    chunks: &[String],
    top_k: usize,
) -> Result<(Vec<String>, Vec<f32>), RankingError> {
    let query_text = format!("{QUERY_INSTRUCTION}{query}");
    let mut query_vectors = embedder.generate_embeddings(vec![query_text]).await?;
    let query_embedding = query_vectors
        .pop()
        .ok_or(RankingError::MissingQueryEmbedding)?;

    // One provider call for the whole batch, in input order.
    let chunk_embeddings = embedder.generate_embeddings(chunks.to_vec()).await?;
    if chunk_embeddings.len() != chunks.len() {
        return Err(RankingError::CountMismatch {
            expected: chunks.len(),
            actual: chunk_embeddings.len(),
        });
    }

    let scores = matvec(&chunk_embeddings, &query_embedding);

    let mut order: Vec<usize> = (0..chunks.len()).collect();
    // Descending by score; equal scores keep the earlier chunk first.
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order.truncate(top_k.min(chunks.len()));

    let ranked_chunks = order.iter().map(|&index| chunks[index].clone()).collect();
    let ranked_scores = order.iter().map(|&index| scores[index]).collect();
    Ok((ranked_chunks, ranked_scores))
}
