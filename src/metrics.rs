use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing serving activity.
#[derive(Default)]
pub struct ServiceMetrics {
    embeddings_served: AtomicU64,
    summaries_generated: AtomicU64,
    overviews_generated: AtomicU64,
    ranking_fallbacks: AtomicU64,
    selection_fallbacks: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record embeddings returned by the generate-embeddings operation.
    pub fn record_embeddings(&self, count: u64) {
        self.embeddings_served.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a completed query-focused summary.
    pub fn record_summary(&self) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed document overview.
    pub fn record_overview(&self) {
        self.overviews_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a ranking pass that degraded to the input-order fallback.
    pub fn record_ranking_fallback(&self) {
        self.ranking_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a selection pass that degraded to the input-order fallback.
    pub fn record_selection_fallback(&self) {
        self.selection_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            embeddings_served: self.embeddings_served.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
            overviews_generated: self.overviews_generated.load(Ordering::Relaxed),
            ranking_fallbacks: self.ranking_fallbacks.load(Ordering::Relaxed),
            selection_fallbacks: self.selection_fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of serving counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of embedding vectors served since startup.
    pub embeddings_served: u64,
    /// Number of query-focused summaries generated since startup.
    pub summaries_generated: u64,
    /// Number of document overviews generated since startup.
    pub overviews_generated: u64,
    /// Ranking passes that fell back to input order.
    pub ranking_fallbacks: u64,
    /// Selection passes that fell back to input order.
    pub selection_fallbacks: u64,
}
