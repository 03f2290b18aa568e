//! Zero-vector fallback for embedding failures.

use super::{EmbeddedBatch, Embedder};
use crate::error::Result;
use async_trait::async_trait;
use tracing::warn;

/// Wraps an embedder so that upstream failures degrade to all-zero vectors.
///
/// A zero vector has cosine similarity 0 with everything. Callers that
/// persist vectors should use [`Embedder::embed_batch_with_status`] and
/// drop degraded batches.
pub struct FallbackEmbedder<E> {
    inner: E,
}

impl<E: Embedder> FallbackEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    fn zeros(&self, count: usize) -> Vec<Vec<f32>> {
        vec![vec![0.0; self.inner.dimensions()]; count]
    }
}

#[async_trait]
impl<E: Embedder> Embedder for FallbackEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
        Ok(embeddings.pop().unwrap_or_else(|| vec![0.0; self.inner.dimensions()]))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.embed_batch_with_status(texts).await?.embeddings)
    }

    async fn embed_batch_with_status(&self, texts: &[String]) -> Result<EmbeddedBatch> {
        match self.inner.embed_batch(texts).await {
            Ok(embeddings) => Ok(EmbeddedBatch {
                embeddings,
                degraded: false,
            }),
            Err(e) => {
                warn!(
                    "Embedding failed for {} texts, substituting zero vectors: {}",
                    texts.len(),
                    e
                );
                Ok(EmbeddedBatch {
                    embeddings: self.zeros(texts.len()),
                    degraded: true,
                })
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}
