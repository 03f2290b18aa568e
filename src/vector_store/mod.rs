//! Vector store abstraction for indexed document chunks.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod postgres;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use postgres::{HnswParams, PgVectorStore};
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for content-derived document keys.
const DOC_KEY_NAMESPACE: Uuid = Uuid::from_u128(0x6b1d_54f2_3e0a_4c8e_9a27_f1d0_c3b5_7e64);

/// Deterministic key for a document's content.
///
/// Re-importing identical content yields the same key, which lets ingestion
/// skip documents that are already indexed.
pub fn doc_key(content: &str) -> Uuid {
    Uuid::new_v5(&DOC_KEY_NAMESPACE, content.as_bytes())
}

/// An embedded chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk ID, derived from the document key and chunk order.
    pub id: Uuid,
    /// Key of the document this chunk belongs to.
    pub doc_key: Uuid,
    /// Order of this chunk in the document.
    pub chunk_order: i32,
    /// Text content of this chunk.
    pub content: String,
    /// Approximate token count.
    pub tokens: i32,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl StoredChunk {
    /// Create a new chunk for a document.
    pub fn new(doc_key: Uuid, chunk_order: i32, content: String, tokens: usize, embedding: Vec<f32>) -> Self {
        let id = Uuid::new_v5(&doc_key, &chunk_order.to_be_bytes());
        Self {
            id,
            doc_key,
            chunk_order,
            content,
            tokens: tokens as i32,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: StoredChunk,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk upsert chunks. Existing chunks with the same ID are replaced.
    async fn upsert_batch(&self, chunks: &[StoredChunk]) -> Result<usize>;

    /// Search for similar chunks.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::MIN).await
    }

    /// Search with a minimum similarity threshold, best match first.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Check if any chunk of a document is stored.
    async fn is_doc_indexed(&self, doc_key: &Uuid) -> Result<bool>;

    /// Get total chunk count.
    async fn chunk_count(&self) -> Result<usize>;

    /// Get number of distinct documents.
    async fn document_count(&self) -> Result<usize>;

    /// Release connections. Stores without external resources do nothing.
    async fn close(&self) {}
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Keep results at or above `min_score`, best first, at most `limit`.
pub(crate) fn rank(mut results: Vec<SearchResult>, limit: usize, min_score: f32) -> Vec<SearchResult> {
    results.retain(|r| r.score >= min_score);
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_vector_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_doc_key_is_deterministic() {
        assert_eq!(doc_key("Pier 60"), doc_key("Pier 60"));
        assert_ne!(doc_key("Pier 60"), doc_key("Pier 61"));
    }

    #[test]
    fn test_chunk_ids_differ_by_order() {
        let key = doc_key("content");
        let first = StoredChunk::new(key, 0, "a".to_string(), 1, vec![]);
        let second = StoredChunk::new(key, 1, "b".to_string(), 1, vec![]);
        assert_ne!(first.id, second.id);
        assert_eq!(first.id, StoredChunk::new(key, 0, "a".to_string(), 1, vec![]).id);
    }
}
