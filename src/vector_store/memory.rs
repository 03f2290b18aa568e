//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, rank, SearchResult, StoredChunk, VectorStore};
use crate::error::{Result, TravelRagError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory vector store.
pub struct MemoryVectorStore {
    chunks: RwLock<HashMap<Uuid, StoredChunk>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, StoredChunk>>> {
        self.chunks
            .read()
            .map_err(|e| TravelRagError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, StoredChunk>>> {
        self.chunks
            .write()
            .map_err(|e| TravelRagError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, chunks: &[StoredChunk]) -> Result<usize> {
        let mut store = self.write()?;
        for chunk in chunks {
            store.insert(chunk.id, chunk.clone());
        }
        Ok(chunks.len())
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let store = self.read()?;

        let results = store
            .values()
            .map(|chunk| SearchResult {
                score: cosine_similarity(query_embedding, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        Ok(rank(results, limit, min_score))
    }

    async fn is_doc_indexed(&self, doc_key: &Uuid) -> Result<bool> {
        Ok(self.read()?.values().any(|c| &c.doc_key == doc_key))
    }

    async fn chunk_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    async fn document_count(&self) -> Result<usize> {
        let store = self.read()?;
        let keys: HashSet<&Uuid> = store.values().map(|c| &c.doc_key).collect();
        Ok(keys.len())
    }
}
