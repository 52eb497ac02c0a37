//! Summarization pipeline: rank or select chunks, then generate text.

mod prompts;
mod service;
mod types;

pub use service::{SummaryApi, SummaryService};
pub use types::{OverviewOutcome, SummarizeOutcome, SummaryError};
