//! PostgreSQL + pgvector vector store.
//!
//! Chunks live in a single table keyed by `(workspace, id)`, so several
//! knowledge bases can share one database. Vectors are bound and decoded
//! as [`pgvector::Vector`].

use super::{SearchResult, StoredChunk, VectorStore};
use crate::config::{PostgresSettings, RagSettings};
use crate::db;
use crate::error::{Result, TravelRagError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Row};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const TABLE: &str = "travel_rag_chunks";

/// HNSW index parameters.
#[derive(Debug, Clone, Copy)]
pub struct HnswParams {
    pub m: u32,
    pub ef_construction: u32,
}

impl From<&RagSettings> for HnswParams {
    fn from(settings: &RagSettings) -> Self {
        Self {
            m: settings.hnsw_m,
            ef_construction: settings.hnsw_ef,
        }
    }
}

/// pgvector-backed store.
pub struct PgVectorStore {
    pool: PgPool,
    workspace: String,
    dimensions: usize,
}

impl FromRow<'_, PgRow> for StoredChunk {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        let embedding: Vector = row.try_get("embedding")?;
        let indexed_at: DateTime<Utc> = row.try_get("indexed_at")?;

        Ok(StoredChunk {
            id: row.try_get("id")?,
            doc_key: row.try_get("doc_key")?,
            chunk_order: row.try_get("chunk_order")?,
            content: row.try_get("content")?,
            tokens: row.try_get("tokens")?,
            embedding: embedding.to_vec(),
            indexed_at,
        })
    }
}

impl PgVectorStore {
    /// Connect and make sure the schema exists.
    pub async fn connect(
        settings: &PostgresSettings,
        dimensions: usize,
        hnsw: HnswParams,
        max_connections: u32,
    ) -> Result<Self> {
        let pool = db::connect(settings, max_connections).await?;
        let store = Self::with_pool(pool, &settings.workspace, dimensions);
        store.initialize(hnsw).await?;
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema.
    pub fn with_pool(pool: PgPool, workspace: &str, dimensions: usize) -> Self {
        Self {
            pool,
            workspace: workspace.to_string(),
            dimensions,
        }
    }

    /// Create the extension, table and indexes if missing.
    #[instrument(skip(self))]
    pub async fn initialize(&self, hnsw: HnswParams) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {TABLE} (
                workspace TEXT NOT NULL,
                id UUID NOT NULL,
                doc_key UUID NOT NULL,
                chunk_order INTEGER NOT NULL,
                content TEXT NOT NULL,
                tokens INTEGER NOT NULL,
                embedding vector({dims}) NOT NULL,
                indexed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (workspace, id)
            )
            "#,
            dims = self.dimensions,
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let doc_index = format!(
            "CREATE INDEX IF NOT EXISTS {TABLE}_doc_key_idx ON {TABLE} (workspace, doc_key)"
        );
        sqlx::query(&doc_index).execute(&self.pool).await?;

        let hnsw_index = format!(
            "CREATE INDEX IF NOT EXISTS {TABLE}_embedding_idx ON {TABLE} \
             USING hnsw (embedding vector_cosine_ops) WITH (m = {}, ef_construction = {})",
            hnsw.m, hnsw.ef_construction
        );
        sqlx::query(&hnsw_index).execute(&self.pool).await?;

        info!(
            "Initialized pgvector store (table {}, workspace {}, {} dims)",
            TABLE, self.workspace, self.dimensions
        );
        Ok(())
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(TravelRagError::VectorStore(format!(
                "Embedding has {} dimensions, store expects {}",
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn upsert_batch(&self, chunks: &[StoredChunk]) -> Result<usize> {
        let sql = format!(
            r#"
            INSERT INTO {TABLE}
                (workspace, id, doc_key, chunk_order, content, tokens, embedding, indexed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (workspace, id) DO UPDATE SET
                content = EXCLUDED.content,
                tokens = EXCLUDED.tokens,
                embedding = EXCLUDED.embedding,
                indexed_at = EXCLUDED.indexed_at
            "#
        );

        for chunk in chunks {
            self.check_dimensions(&chunk.embedding)?;
        }

        let mut tx = self.pool.begin().await?;
        for chunk in chunks {
            sqlx::query(&sql)
                .bind(&self.workspace)
                .bind(chunk.id)
                .bind(chunk.doc_key)
                .bind(chunk.chunk_order)
                .bind(&chunk.content)
                .bind(chunk.tokens)
                .bind(Vector::from(chunk.embedding.clone()))
                .bind(chunk.indexed_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

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
        self.check_dimensions(query_embedding)?;

        let sql = format!(
            r#"
            SELECT id, doc_key, chunk_order, content, tokens, indexed_at,
                   embedding,
                   1 - (embedding <=> $1) AS score
            FROM {TABLE}
            WHERE workspace = $2
              AND 1 - (embedding <=> $1) >= $3
            ORDER BY embedding <=> $1
            LIMIT $4
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(Vector::from(query_embedding.to_vec()))
            .bind(&self.workspace)
            .bind(min_score as f64)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            let score: f64 = row.try_get("score")?;
            results.push(SearchResult {
                chunk: StoredChunk::from_row(row)?,
                score: score as f32,
            });
        }

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn is_doc_indexed(&self, doc_key: &Uuid) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {TABLE} WHERE workspace = $1 AND doc_key = $2)"
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(&self.workspace)
            .bind(doc_key)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {TABLE} WHERE workspace = $1");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(&self.workspace)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn document_count(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(DISTINCT doc_key) FROM {TABLE} WHERE workspace = $1");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(&self.workspace)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("Vector store connection closed");
    }
}
