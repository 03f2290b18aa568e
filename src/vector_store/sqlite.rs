//! SQLite-based vector store implementation.
//!
//! Used for local mode. Cosine similarity is computed in Rust over all
//! stored chunks, which is fine at the size of a single city's catalogue.

use super::{cosine_similarity, rank, SearchResult, StoredChunk, VectorStore};
use crate::error::{Result, TravelRagError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        doc_key TEXT NOT NULL,
        chunk_order INTEGER NOT NULL,
        content TEXT NOT NULL,
        tokens INTEGER NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_doc_key ON chunks(doc_key);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open or create a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL lets a query run while an import is writing
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TravelRagError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_chunk(row: &Row<'_>) -> rusqlite::Result<StoredChunk> {
        let id_str: String = row.get(0)?;
        let doc_key_str: String = row.get(1)?;
        let embedding_bytes: Vec<u8> = row.get(5)?;
        let indexed_at_str: String = row.get(6)?;

        Ok(StoredChunk {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            doc_key: Uuid::parse_str(&doc_key_str).unwrap_or_default(),
            chunk_order: row.get(2)?,
            content: row.get(3)?,
            tokens: row.get(4)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn upsert_batch(&self, chunks: &[StoredChunk]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (id, doc_key, chunk_order, content, tokens, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    chunk.id.to_string(),
                    chunk.doc_key.to_string(),
                    chunk.chunk_order,
                    chunk.content,
                    chunk.tokens,
                    Self::embedding_to_bytes(&chunk.embedding),
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Batch upserted {} chunks", chunks.len());
        Ok(chunks.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, doc_key, chunk_order, content, tokens, embedding, indexed_at FROM chunks",
        )?;

        let results = stmt
            .query_map([], Self::row_to_chunk)?
            .filter_map(|chunk| chunk.ok())
            .map(|chunk| SearchResult {
                score: cosine_similarity(query_embedding, &chunk.embedding),
                chunk,
            })
            .collect();

        let results = rank(results, limit, min_score);
        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn is_doc_indexed(&self, doc_key: &Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE doc_key = ?1",
            params![doc_key.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(DISTINCT doc_key) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::doc_key;

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let key = doc_key("Seminole Hard Rock Hotel & Casino");

        let chunk = StoredChunk::new(
            key,
            0,
            "Seminole Hard Rock Hotel & Casino is located in Tampa, FL.".to_string(),
            12,
            vec![1.0, 0.0, 0.0],
        );
        store.upsert_batch(&[chunk]).await.unwrap();

        assert!(store.is_doc_indexed(&key).await.unwrap());
        assert_eq!(store.document_count().await.unwrap(), 1);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].chunk.doc_key, key);
        assert_eq!(results[0].chunk.tokens, 12);
        assert_eq!(store.chunk_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rag").join("vectors.db");
        let key = doc_key("persisted");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store
                .upsert_batch(&[StoredChunk::new(key, 0, "persisted".to_string(), 1, vec![0.5, 0.5])])
                .await
                .unwrap();
        }

        let reopened = SqliteVectorStore::new(&path).unwrap();
        assert!(reopened.is_doc_indexed(&key).await.unwrap());
        let results = reopened.search_with_threshold(&[0.5, 0.5], 5, 0.2).await.unwrap();
        assert_eq!(results[0].chunk.embedding, vec![0.5, 0.5]);
    }
}
