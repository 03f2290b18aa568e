//! Context building for RAG responses.

use crate::vector_store::SearchResult;

/// A retrieved chunk, ready to be placed in a prompt.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            content: result.chunk.content,
            score: result.score,
        }
    }
}

/// Convert raw search results, keeping rank order.
pub fn from_results(results: Vec<SearchResult>) -> Vec<ContextChunk> {
    results.into_iter().map(ContextChunk::from).collect()
}

/// Format context chunks for a prompt as numbered excerpts.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("---\n[{}]\n{}\n---", i + 1, chunk.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
