//! RAG (Retrieval-Augmented Generation) over place documents.
//!
//! The [`RagEngine`] trait is the seam between the ingestion and query
//! commands and whatever engine backs the knowledge base.

pub mod context;
mod engine;

pub use context::ContextChunk;
pub use engine::{StoreBackend, VectorRagEngine};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Answer returned when retrieval finds nothing relevant.
pub const FAIL_RESPONSE: &str = "Sorry, I'm not able to provide an answer to that question.[no-context]";

/// Retrieval mode for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Plain chunk retrieval.
    Naive,
    /// Entity-centred retrieval.
    Local,
    /// Relationship-centred retrieval.
    Global,
    /// Local and global combined.
    Hybrid,
    /// Graph and chunk retrieval combined.
    #[default]
    Mix,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Naive => "naive",
            QueryMode::Local => "local",
            QueryMode::Global => "global",
            QueryMode::Hybrid => "hybrid",
            QueryMode::Mix => "mix",
        }
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one insert call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Documents newly indexed.
    pub inserted: usize,
    /// Documents skipped because identical content was already indexed.
    pub skipped: usize,
    /// Documents left unindexed because their embeddings could not be generated.
    pub failed: usize,
    /// Chunks written.
    pub chunks: usize,
}

/// A knowledge base that can ingest documents and answer questions.
#[async_trait]
pub trait RagEngine: Send + Sync {
    /// Ingest document contents, in order.
    async fn insert(&self, contents: &[String]) -> Result<InsertReport>;

    /// Answer a question.
    async fn query(&self, question: &str, mode: QueryMode) -> Result<String>;

    /// Release storage connections.
    async fn finalize(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_default_and_display() {
        assert_eq!(QueryMode::default(), QueryMode::Mix);
        assert_eq!(QueryMode::Hybrid.to_string(), "hybrid");
    }
}
