//! Embedding generation for semantic search and retrieval.

mod fallback;
mod openai;

pub use fallback::FallbackEmbedder;
pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Embeddings for one batch, flagged when they are stand-ins for a failed call.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedBatch {
    pub embeddings: Vec<Vec<f32>>,
    pub degraded: bool,
}

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Like [`Embedder::embed_batch`], but says whether the vectors are real.
    async fn embed_batch_with_status(&self, texts: &[String]) -> Result<EmbeddedBatch> {
        Ok(EmbeddedBatch {
            embeddings: self.embed_batch(texts).await?,
            degraded: false,
        })
    }

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}
