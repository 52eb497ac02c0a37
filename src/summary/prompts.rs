//! Prompt assembly for the generative backend.
//!
//! Chunks are joined with a blank line so passage boundaries survive into the
//! prompt; the generator sees them in the order the pipeline supplied them.

/// System framing for query-focused summaries.
pub(crate) const FOCUSED_SYSTEM_PROMPT: &str = "You are an expert summarizer. Your task is to \
create a concise, coherent summary of the provided text that specifically addresses the user's \
query. Focus on the most relevant information while maintaining accuracy.";

/// System framing for whole-document overviews.
pub(crate) const OVERVIEW_SYSTEM_PROMPT: &str = "You are an expert document analyzer and \
summarizer. Your task is to provide a comprehensive overview of the document and identify its \
key topics.";

/// Build the user prompt for a query-focused summary.
pub(crate) fn build_focused_prompt(query: &str, chunks: &[String]) -> String {
    let context = chunks.join("\n\n");
    format!(
        "Query: {query}\n\n\
         Text to summarize:\n{context}\n\n\
         Generate a focused summary that answers the query. Ensure the summary is coherent and \
         directly addresses the query while maintaining factual accuracy. If the text doesn't \
         contain relevant information to answer the query, mention that explicitly."
    )
}

/// Build the user prompt for a document overview.
pub(crate) fn build_overview_prompt(chunks: &[String]) -> String {
    let context = chunks.join("\n\n");
    format!(
        "Analyze the following document excerpts and provide:\n\
         1. A high-level overview that captures the main points and purpose of the document\n\
         2. A list of key topics or themes discussed in the document\n\n\
         Text to analyze:\n{context}\n\n\
         Provide the overview and topics in a clear, structured format. Focus on giving readers \
         a strong understanding of what the document is about and what they can expect to learn \
         from it."
    )
}

/// Build the follow-up prompt that extracts a topic list from an overview.
pub(crate) fn build_topics_prompt(overview: &str) -> String {
    format!(
        "Based on this overview, list the key topics in a concise format:\n\n\
         {overview}\n\n\
         Return only the topics, one per line, without numbers or bullets."
    )
}
