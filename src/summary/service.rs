//! Summarization service coordinating ranking, selection, and generation.

use crate::{
    config::get_config,
    embedding::EmbeddingClient,
    generation::{ChatMessage, CompletionRequest, GenerativeClient},
    metrics::{MetricsSnapshot, ServiceMetrics},
    ranking::{rank_chunks, select_representative},
    summary::{
        prompts::{
            FOCUSED_SYSTEM_PROMPT, OVERVIEW_SYSTEM_PROMPT, build_focused_prompt,
            build_overview_prompt, build_topics_prompt,
        },
        types::{OverviewOutcome, SummarizeOutcome, SummaryError},
    },
};
use async_trait::async_trait;
use std::sync::Arc;

/// Sampling temperature for summary and overview generations.
const SUMMARY_TEMPERATURE: f32 = 0.3;
/// Sampling temperature for topic extraction; lower keeps the list stable.
const TOPIC_TEMPERATURE: f32 = 0.1;
/// Token budget for the topic-extraction call.
const TOPIC_MAX_TOKENS: u32 = 200;

/// Coordinates the full pipeline: chunk ranking or selection, prompt assembly,
/// and generation against the chat backend.
///
/// The service owns the embedding and generative client handles. Both are
/// stateless per call, so a single instance constructed near process start is
/// shared through an `Arc` by every in-flight request.
pub struct SummaryService {
    embedder: Box<dyn EmbeddingClient>,
    generator: Box<dyn GenerativeClient>,
    metrics: Arc<ServiceMetrics>,
}

/// Abstraction over the summarization pipeline used by the HTTP surface.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Produce one unit-norm embedding per supplied text.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, SummaryError>;

    /// Rank chunks against the query and summarize the best of them.
    async fn summarize(
        &self,
        query: String,
        chunks: Vec<String>,
        max_tokens: u32,
        top_k: usize,
    ) -> Result<SummarizeOutcome, SummaryError>;

    /// Select representative chunks and produce an overview plus topic list.
    async fn initial_summary(
        &self,
        chunks: Vec<String>,
        max_tokens: u32,
        chunk_count: usize,
    ) -> Result<OverviewOutcome, SummaryError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummaryService {
    /// Build the service from explicitly constructed clients.
    pub fn new(
        embedder: Box<dyn EmbeddingClient>,
        generator: Box<dyn GenerativeClient>,
    ) -> Self {
        Self {
            embedder,
            generator,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, SummaryError> {
        let model = get_config().mistral_model.clone();
        let text = self
            .generator
            .complete(CompletionRequest {
                model,
                messages,
                max_tokens,
                temperature,
            })
            .await?;
        Ok(text)
    }

    /// Produce embeddings for arbitrary caller-supplied texts.
    pub async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, SummaryError> {
        let embeddings = self.embedder.generate_embeddings(texts).await?;
        self.metrics.record_embeddings(embeddings.len() as u64);
        Ok(embeddings)
    }

    /// Rank chunks against the query and summarize the best of them.
    pub async fn summarize(
        &self,
        query: String,
        chunks: Vec<String>,
        max_tokens: u32,
        top_k: usize,
    ) -> Result<SummarizeOutcome, SummaryError> {
        tracing::info!(chunks = chunks.len(), top_k, "Summarize request");

        let ranked = rank_chunks(self.embedder.as_ref(), &query, &chunks, top_k).await;
        if ranked.fallback {
            self.metrics.record_ranking_fallback();
        }

        let messages = vec![
            ChatMessage::system(FOCUSED_SYSTEM_PROMPT),
            ChatMessage::user(build_focused_prompt(&query, &ranked.chunks)),
        ];
        let summary = self
            .complete(messages, max_tokens, SUMMARY_TEMPERATURE)
            .await?;

        self.metrics.record_summary();
        tracing::info!(
            ranked = ranked.chunks.len(),
            fallback = ranked.fallback,
            "Summarize request completed"
        );

        Ok(SummarizeOutcome {
            summary,
            ranked_chunks: ranked.chunks,
            chunk_scores: ranked.scores,
        })
    }

    /// Select representative chunks and produce an overview plus topic list.
    pub async fn initial_summary(
        &self,
        chunks: Vec<String>,
        max_tokens: u32,
        chunk_count: usize,
    ) -> Result<OverviewOutcome, SummaryError> {
        tracing::info!(chunks = chunks.len(), chunk_count, "Initial summary request");

        let selected = select_representative(self.embedder.as_ref(), &chunks, chunk_count).await;
        if selected.fallback {
            self.metrics.record_selection_fallback();
        }

        let overview_messages = vec![
            ChatMessage::system(OVERVIEW_SYSTEM_PROMPT),
            ChatMessage::user(build_overview_prompt(&selected.chunks)),
        ];
        let overview = self
            .complete(overview_messages, max_tokens, SUMMARY_TEMPERATURE)
            .await?;

        // Second pass distills the overview into one topic per line.
        let topic_messages = vec![ChatMessage::user(build_topics_prompt(&overview))];
        let topics_text = self
            .complete(topic_messages, TOPIC_MAX_TOKENS, TOPIC_TEMPERATURE)
            .await?;
        let key_topics = topics_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        self.metrics.record_overview();
        tracing::info!(
            selected = selected.chunks.len(),
            fallback = selected.fallback,
            "Initial summary request completed"
        );

        Ok(OverviewOutcome {
            overview_summary: overview,
            key_topics,
            selected_chunks: selected.chunks,
        })
    }

    /// Return the current serving metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl SummaryApi for SummaryService {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, SummaryError> {
        SummaryService::generate_embeddings(self, texts).await
    }

    async fn summarize(
        &self,
        query: String,
        chunks: Vec<String>,
        max_tokens: u32,
        top_k: usize,
    ) -> Result<SummarizeOutcome, SummaryError> {
        SummaryService::summarize(self, query, chunks, max_tokens, top_k).await
    }

    async fn initial_summary(
        &self,
        chunks: Vec<String>,
        max_tokens: u32,
        chunk_count: usize,
    ) -> Result<OverviewOutcome, SummaryError> {
        SummaryService::initial_summary(self, chunks, max_tokens, chunk_count).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryService::metrics_snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG, Config};
    use crate::embedding::{EmbeddingClient, EmbeddingClientError};
    use crate::generation::{GenerationClientError, GenerativeClient, Role};
    use std::sync::Once;
    use tokio::sync::Mutex;

    fn ensure_test_config() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = CONFIG.set(Config {
                mistral_api_key: "test-key".into(),
                mistral_url: None,
                mistral_model: "mistral-medium".into(),
                ollama_url: None,
                embedding_model: "test-embed".into(),
                embedding_dimension: 3,
                server_port: None,
            });
        });
    }

    struct MapEmbedder {
        vectors: Vec<(String, Vec<f32>)>,
    }

    impl MapEmbedder {
        fn new(vectors: Vec<(&str, Vec<f32>)>) -> Self {
            Self {
                vectors: vectors
                    .into_iter()
                    .map(|(text, vector)| (text.to_string(), vector))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl EmbeddingClient for MapEmbedder {
        async fn generate_embeddings(
            &self,
            texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
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

    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingClient for BrokenEmbedder {
        async fn generate_embeddings(
            &self,
            _texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
            Err(EmbeddingClientError::ProviderUnavailable(
                "stubbed outage".into(),
            ))
        }
    }

    /// Returns canned responses in order and records every request.
    struct ScriptedGenerator {
        responses: Vec<String>,
        calls: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: responses.into_iter().map(str::to_string).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeClient for ScriptedGenerator {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<String, GenerationClientError> {
            let mut calls = self.calls.lock().await;
            let index = calls.len();
            calls.push(request);
            self.responses
                .get(index)
                .cloned()
                .ok_or_else(|| {
                    GenerationClientError::GenerationFailed("script exhausted".into())
                })
        }
    }

    /// Trait-object wrapper so a test can keep a handle on the script.
    struct SharedGenerator(Arc<ScriptedGenerator>);

    #[async_trait]
    impl GenerativeClient for SharedGenerator {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<String, GenerationClientError> {
            self.0.complete(request).await
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl GenerativeClient for FailingGenerator {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<String, GenerationClientError> {
            Err(GenerationClientError::GenerationFailed(
                "backend down".into(),
            ))
        }
    }

    fn scenario_chunks() -> Vec<String> {
        vec![
            "Paris is the capital of France.".to_string(),
            "The Eiffel Tower is in Paris.".to_string(),
            "Bananas are yellow.".to_string(),
        ]
    }

    fn scenario_embedder() -> MapEmbedder {
        MapEmbedder::new(vec![
            (
                "Represent this sentence for retrieving relevant passages: \
                 What is the capital of France?",
                vec![1.0, 0.0, 0.0],
            ),
            ("Paris is the capital of France.", vec![0.96, 0.28, 0.0]),
            ("The Eiffel Tower is in Paris.", vec![0.6, 0.8, 0.0]),
            ("Bananas are yellow.", vec![0.0, 0.0, 1.0]),
        ])
    }

    #[tokio::test]
    async fn summarize_returns_backend_text_and_ranker_output() {
        ensure_test_config();
        let generator = ScriptedGenerator::new(vec!["A fixed summary."]);
        let service = SummaryService::new(
            Box::new(scenario_embedder()),
            Box::new(generator),
        );

        let outcome = service
            .summarize(
                "What is the capital of France?".into(),
                scenario_chunks(),
                512,
                2,
            )
            .await
            .expect("summarize");

        assert_eq!(outcome.summary, "A fixed summary.");
        assert_eq!(
            outcome.ranked_chunks,
            vec![
                "Paris is the capital of France.".to_string(),
                "The Eiffel Tower is in Paris.".to_string(),
            ]
        );
        assert_eq!(outcome.chunk_scores.len(), 2);
        assert!(outcome.chunk_scores[0] >= outcome.chunk_scores[1]);

        let snapshot = service.metrics_snapshot();
        assert_eq!(snapshot.summaries_generated, 1);
        assert_eq!(snapshot.ranking_fallbacks, 0);
    }

    #[tokio::test]
    async fn summarize_prompt_carries_query_and_ranked_chunks() {
        ensure_test_config();
        let generator = Arc::new(ScriptedGenerator::new(vec!["ok"]));
        let service = SummaryService::new(
            Box::new(scenario_embedder()),
            Box::new(SharedGenerator(Arc::clone(&generator))),
        );

        service
            .summarize(
                "What is the capital of France?".into(),
                scenario_chunks(),
                512,
                1,
            )
            .await
            .expect("summarize");

        let calls = generator.calls.lock().await;
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.model, "mistral-medium");
        assert_eq!(call.max_tokens, 512);
        assert!(matches!(call.messages[0].role, Role::System));
        let user_prompt = &call.messages[1].content;
        assert!(user_prompt.contains("Query: What is the capital of France?"));
        // Only the single top-ranked chunk reaches the prompt.
        assert!(user_prompt.contains("Paris is the capital of France."));
        assert!(!user_prompt.contains("Bananas are yellow."));
    }

    #[tokio::test]
    async fn summarize_survives_embedding_outage_with_fallback_ranking() {
        ensure_test_config();
        let generator = ScriptedGenerator::new(vec!["Degraded summary."]);
        let service = SummaryService::new(Box::new(BrokenEmbedder), Box::new(generator));

        let chunks = scenario_chunks();
        let outcome = service
            .summarize("anything".into(), chunks.clone(), 512, 2)
            .await
            .expect("summarize despite outage");

        assert_eq!(outcome.summary, "Degraded summary.");
        assert_eq!(outcome.ranked_chunks, chunks[..2].to_vec());
        assert_eq!(outcome.chunk_scores, vec![1.0, 1.0]);
        assert_eq!(service.metrics_snapshot().ranking_fallbacks, 1);
    }

    #[tokio::test]
    async fn summarize_propagates_backend_failure() {
        ensure_test_config();
        let service = SummaryService::new(
            Box::new(scenario_embedder()),
            Box::new(FailingGenerator),
        );

        let error = service
            .summarize(
                "What is the capital of France?".into(),
                scenario_chunks(),
                512,
                2,
            )
            .await
            .expect_err("backend failure surfaces");

        assert!(matches!(error, SummaryError::Generation(_)));
        assert_eq!(service.metrics_snapshot().summaries_generated, 0);
    }

    #[tokio::test]
    async fn initial_summary_extracts_trimmed_topics() {
        ensure_test_config();
        let generator = ScriptedGenerator::new(vec!["An overview.", "A\n\nB\nC"]);
        let embedder = MapEmbedder::new(vec![
            ("first", vec![1.0, 0.0, 0.0]),
            ("second", vec![0.0, 1.0, 0.0]),
        ]);
        let service = SummaryService::new(Box::new(embedder), Box::new(generator));

        let outcome = service
            .initial_summary(vec!["first".into(), "second".into()], 512, 2)
            .await
            .expect("initial summary");

        assert_eq!(outcome.overview_summary, "An overview.");
        assert_eq!(
            outcome.key_topics,
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
        assert_eq!(
            outcome.selected_chunks,
            vec!["first".to_string(), "second".to_string()]
        );
        assert_eq!(service.metrics_snapshot().overviews_generated, 1);
    }

    #[tokio::test]
    async fn topic_call_uses_low_temperature_and_bounded_tokens() {
        ensure_test_config();
        let generator = Arc::new(ScriptedGenerator::new(vec!["Overview.", "topic"]));
        let embedder = MapEmbedder::new(vec![("only", vec![1.0, 0.0, 0.0])]);

        let service = SummaryService::new(
            Box::new(embedder),
            Box::new(SharedGenerator(Arc::clone(&generator))),
        );
        service
            .initial_summary(vec!["only".into()], 512, 1)
            .await
            .expect("initial summary");

        let calls = generator.calls.lock().await;
        assert_eq!(calls.len(), 2);

        let overview_call = &calls[0];
        assert_eq!(overview_call.max_tokens, 512);
        assert!((overview_call.temperature - 0.3).abs() < f32::EPSILON);
        assert!(matches!(overview_call.messages[0].role, Role::System));

        let topic_call = &calls[1];
        assert_eq!(topic_call.max_tokens, 200);
        assert!((topic_call.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(topic_call.messages.len(), 1);
        assert!(topic_call.messages[0].content.contains("Overview."));
    }

    #[tokio::test]
    async fn initial_summary_survives_embedding_outage() {
        ensure_test_config();
        let generator = ScriptedGenerator::new(vec!["Overview.", "topic"]);
        let service = SummaryService::new(Box::new(BrokenEmbedder), Box::new(generator));

        let chunks = scenario_chunks();
        let outcome = service
            .initial_summary(chunks.clone(), 512, 2)
            .await
            .expect("initial summary despite outage");

        assert_eq!(outcome.selected_chunks, chunks[..2].to_vec());
        assert_eq!(service.metrics_snapshot().selection_fallbacks, 1);
    }

    #[tokio::test]
    async fn generate_embeddings_passes_provider_errors_through() {
        ensure_test_config();
        let service = SummaryService::new(
            Box::new(BrokenEmbedder),
            Box::new(ScriptedGenerator::new(vec![])),
        );

        let error = service
            .generate_embeddings(vec!["text".into()])
            .await
            .expect_err("provider error surfaces");

        assert!(matches!(error, SummaryError::Embedding(_)));
    }
}
