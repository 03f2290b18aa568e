//! Vector RAG engine: chunk, embed, store, retrieve, answer.

use super::context::{self, format_context_for_prompt};
use super::{InsertReport, QueryMode, RagEngine, FAIL_RESPONSE};
use crate::chunking::{TextChunk, TokenChunker};
use crate::config::{Prompts, Settings};
use crate::embedding::{EmbeddedBatch, Embedder, FallbackEmbedder, OpenAIEmbedder};
use crate::error::{Result, TravelRagError};
use crate::llm::{ChatModel, CompletionRequest, OpenAIChat};
use crate::vector_store::{
    doc_key, HnswParams, PgVectorStore, SqliteVectorStore, StoredChunk, VectorStore,
};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Chunks written per store round trip.
const UPSERT_BATCH: usize = 100;

/// Connections kept by the engine's Postgres pool.
const PG_MAX_CONNECTIONS: u32 = 4;

/// Where the engine keeps its vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// pgvector table in the configured database.
    Postgres,
    /// SQLite file in the working directory.
    Local,
}

/// RAG engine over a vector store.
pub struct VectorRagEngine {
    llm: Arc<dyn ChatModel>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: TokenChunker,
    prompts: Prompts,
    embed_batch_size: usize,
    max_async: usize,
    top_k: usize,
    chunk_top_k: usize,
    min_score: f32,
}

impl VectorRagEngine {
    /// Create an engine with default retrieval parameters.
    pub fn new(
        llm: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            llm,
            embedder,
            store,
            chunker: TokenChunker::default(),
            prompts: Prompts::default(),
            embed_batch_size: 10,
            max_async: 16,
            top_k: 20,
            chunk_top_k: 10,
            min_score: 0.2,
        }
    }

    /// Build the production engine from settings.
    ///
    /// The working directory is created in both modes; local mode keeps its
    /// vectors in `vectors.db` inside it.
    pub async fn from_settings(
        settings: &Settings,
        backend: StoreBackend,
        working_dir: &Path,
    ) -> Result<Self> {
        std::fs::create_dir_all(working_dir)?;

        let llm = OpenAIChat::new(&settings.llm)?;
        let embedder = FallbackEmbedder::new(OpenAIEmbedder::new(&settings.llm, &settings.embedding)?);
        let dimensions = embedder.dimensions();

        let store: Arc<dyn VectorStore> = match backend {
            StoreBackend::Postgres => Arc::new(
                PgVectorStore::connect(
                    &settings.postgres,
                    dimensions,
                    HnswParams::from(&settings.rag),
                    PG_MAX_CONNECTIONS,
                )
                .await?,
            ),
            StoreBackend::Local => Arc::new(SqliteVectorStore::new(&working_dir.join("vectors.db"))?),
        };

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        info!(
            "RAG engine ready ({:?} store, working dir {})",
            backend,
            working_dir.display()
        );

        // Chunks must fit in one embedding input
        let chunk_size = settings.rag.chunk_token_size.min(settings.embedding.max_token_size);
        if chunk_size < settings.rag.chunk_token_size {
            warn!(
                "chunk_token_size {} exceeds embedding max_token_size, using {}",
                settings.rag.chunk_token_size, chunk_size
            );
        }

        Ok(Self::new(Arc::new(llm), Arc::new(embedder), store)
            .with_chunker(TokenChunker::new(chunk_size, settings.rag.chunk_overlap_token_size))
            .with_prompts(prompts)
            .with_embedding_concurrency(settings.embedding.batch_size, settings.embedding.max_async)
            .with_retrieval(
                settings.rag.top_k,
                settings.rag.chunk_top_k,
                settings.rag.cosine_better_than_threshold,
            ))
    }

    pub fn with_chunker(mut self, chunker: TokenChunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Texts per embedding request and requests in flight.
    pub fn with_embedding_concurrency(mut self, batch_size: usize, max_async: usize) -> Self {
        self.embed_batch_size = batch_size.max(1);
        self.max_async = max_async.max(1);
        self
    }

    pub fn with_retrieval(mut self, top_k: usize, chunk_top_k: usize, min_score: f32) -> Self {
        self.top_k = top_k;
        self.chunk_top_k = chunk_top_k;
        self.min_score = min_score;
        self
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Number of chunks to retrieve for a mode.
    pub fn retrieval_limit(&self, mode: QueryMode) -> usize {
        match mode {
            QueryMode::Naive => self.chunk_top_k,
            QueryMode::Local | QueryMode::Global | QueryMode::Hybrid | QueryMode::Mix => self.top_k,
        }
    }

    /// Embed texts in batches with bounded concurrency, preserving order.
    ///
    /// Each embedding is paired with whether its batch fell back to
    /// stand-in vectors.
    async fn embed_all(&self, texts: &[String]) -> Result<Vec<(Vec<f32>, bool)>> {
        let batches: Vec<Vec<String>> = texts
            .chunks(self.embed_batch_size)
            .map(|batch| batch.to_vec())
            .collect();

        let results: Vec<EmbeddedBatch> = stream::iter(batches)
            .map(|batch| {
                let embedder = Arc::clone(&self.embedder);
                async move { embedder.embed_batch_with_status(&batch).await }
            })
            .buffered(self.max_async)
            .try_collect()
            .await?;

        let embeddings: Vec<(Vec<f32>, bool)> = results
            .into_iter()
            .flat_map(|batch| {
                let degraded = batch.degraded;
                batch.embeddings.into_iter().map(move |e| (e, degraded))
            })
            .collect();
        if embeddings.len() != texts.len() {
            return Err(TravelRagError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl RagEngine for VectorRagEngine {
    #[instrument(skip(self, contents), fields(count = contents.len()))]
    async fn insert(&self, contents: &[String]) -> Result<InsertReport> {
        let mut report = InsertReport::default();
        let mut seen = HashSet::new();
        let mut pending: Vec<(Uuid, TextChunk)> = Vec::new();
        let mut accepted = 0;

        for content in contents {
            if content.trim().is_empty() {
                report.skipped += 1;
                continue;
            }

            let key = doc_key(content);
            if !seen.insert(key) || self.store.is_doc_indexed(&key).await? {
                debug!("Skipping already indexed document {}", key);
                report.skipped += 1;
                continue;
            }

            pending.extend(self.chunker.chunk(content).into_iter().map(|chunk| (key, chunk)));
            accepted += 1;
        }

        if pending.is_empty() {
            info!("Nothing new to index ({} skipped)", report.skipped);
            return Ok(report);
        }

        info!(
            "Embedding {} chunks from {} documents",
            pending.len(),
            accepted
        );

        let texts: Vec<String> = pending.iter().map(|(_, chunk)| chunk.content.clone()).collect();
        let embeddings = self.embed_all(&texts).await?;

        // A document with any stand-in vector is left out entirely so a
        // later import retries it.
        let failed: HashSet<Uuid> = pending
            .iter()
            .zip(&embeddings)
            .filter(|(_, (_, degraded))| *degraded)
            .map(|((key, _), _)| *key)
            .collect();
        if !failed.is_empty() {
            warn!("{} documents not indexed after embedding failures", failed.len());
        }
        report.failed = failed.len();
        report.inserted = accepted - failed.len();

        let stored: Vec<StoredChunk> = pending
            .into_iter()
            .zip(embeddings)
            .filter(|((key, _), _)| !failed.contains(key))
            .map(|((key, chunk), (embedding, _))| {
                StoredChunk::new(key, chunk.order, chunk.content, chunk.tokens, embedding)
            })
            .collect();

        for batch in stored.chunks(UPSERT_BATCH) {
            report.chunks += self.store.upsert_batch(batch).await?;
        }

        info!(
            "Indexed {} documents ({} chunks), skipped {}, failed {}",
            report.inserted, report.chunks, report.skipped, report.failed
        );
        Ok(report)
    }

    #[instrument(skip(self), fields(mode = %mode))]
    async fn query(&self, question: &str, mode: QueryMode) -> Result<String> {
        let limit = self.retrieval_limit(mode);
        let query_embedding = self.embedder.embed(question).await?;

        let results = self
            .store
            .search_with_threshold(&query_embedding, limit, self.min_score)
            .await?;

        if results.is_empty() {
            info!("No context above similarity {}", self.min_score);
            return Ok(FAIL_RESPONSE.to_string());
        }

        let chunks = context::from_results(results);
        debug!(
            "Retrieved {} context chunks (best score {:.3})",
            chunks.len(),
            chunks[0].score
        );

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context_for_prompt(&chunks));

        let prompt = self.prompts.render_with_custom(&self.prompts.rag.user, &vars);
        let system = self
            .prompts
            .render_with_custom(&self.prompts.rag.system, &HashMap::new());

        let request = CompletionRequest::new(prompt).with_system(system);
        Ok(self.llm.complete(&request).await)
    }

    async fn finalize(&self) {
        self.store.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VOCABULARY: [&str; 3] = ["beach", "casino", "museum"];

    /// One dimension per vocabulary word.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let text = text.to_lowercase();
            Ok(VOCABULARY
                .iter()
                .map(|word| if text.contains(word) { 1.0 } else { 0.0 })
                .collect())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut embeddings = Vec::with_capacity(texts.len());
            for text in texts {
                embeddings.push(self.embed(text).await?);
            }
            Ok(embeddings)
        }

        fn dimensions(&self) -> usize {
            VOCABULARY.len()
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(TravelRagError::OpenAI("quota exceeded".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(TravelRagError::OpenAI("quota exceeded".to_string()))
        }

        fn dimensions(&self) -> usize {
            VOCABULARY.len()
        }
    }

    /// Fails the first `failures_left` calls, then embeds by keyword.
    struct FlakyEmbedder {
        failures_left: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            KeywordEmbedder.embed(text).await
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(TravelRagError::OpenAI("rate limited".to_string()));
            }
            KeywordEmbedder.embed_batch(texts).await
        }

        fn dimensions(&self) -> usize {
            VOCABULARY.len()
        }
    }

    /// Answers with the prompt it was given.
    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn try_complete(&self, request: &CompletionRequest) -> Result<String> {
            Ok(request.prompt.clone())
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    fn engine_with(embedder: Arc<dyn Embedder>) -> VectorRagEngine {
        VectorRagEngine::new(Arc::new(EchoModel), embedder, Arc::new(MemoryVectorStore::new()))
            .with_embedding_concurrency(1, 4)
    }

    fn documents() -> Vec<String> {
        vec![
            "Clearwater Beach is a beach in Clearwater, FL.\nRating: 4.80 (25,000 reviews)".to_string(),
            "Seminole Hard Rock Hotel & Casino is a casino in Tampa, FL.".to_string(),
            "The Dali Museum is a museum in St. Petersburg, FL.".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_insert_then_reinsert_skips() {
        let engine = engine_with(Arc::new(KeywordEmbedder));

        let report = engine.insert(&documents()).await.unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.chunks, 3);

        let again = engine.insert(&documents()).await.unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.skipped, 3);
        assert_eq!(engine.store().chunk_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicates_in_one_call_are_skipped() {
        let engine = engine_with(Arc::new(KeywordEmbedder));
        let docs = vec!["A beach.".to_string(), "A beach.".to_string(), "  ".to_string()];

        let report = engine.insert(&docs).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 2);
    }

    #[tokio::test]
    async fn test_query_answers_from_matching_context() {
        let engine = engine_with(Arc::new(KeywordEmbedder));
        engine.insert(&documents()).await.unwrap();

        let answer = engine
            .query("Which casino should I visit?", QueryMode::Mix)
            .await
            .unwrap();

        assert!(answer.contains("Question: Which casino should I visit?"));
        assert!(answer.contains("[1]\nSeminole Hard Rock Hotel & Casino"));
        assert!(!answer.contains("Clearwater Beach"));
        assert!(!answer.contains("Dali Museum"));
    }

    #[tokio::test]
    async fn test_query_without_context_returns_fail_response() {
        let engine = engine_with(Arc::new(KeywordEmbedder));
        engine.insert(&documents()).await.unwrap();

        let answer = engine.query("Where can I ski?", QueryMode::Naive).await.unwrap();
        assert_eq!(answer, FAIL_RESPONSE);
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_no_context() {
        let engine = engine_with(Arc::new(FallbackEmbedder::new(FailingEmbedder)));

        let report = engine.insert(&documents()).await.unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(report.failed, 3);
        assert_eq!(report.chunks, 0);
        assert_eq!(engine.store().chunk_count().await.unwrap(), 0);

        let answer = engine.query("beach", QueryMode::Mix).await.unwrap();
        assert_eq!(answer, FAIL_RESPONSE);
    }

    #[tokio::test]
    async fn test_reimport_after_transient_embedding_failure() {
        let flaky = FlakyEmbedder {
            failures_left: AtomicUsize::new(1),
        };
        let engine = engine_with(Arc::new(FallbackEmbedder::new(flaky)));
        let docs = vec!["Clearwater Beach is a beach in Clearwater, FL.".to_string()];

        let first = engine.insert(&docs).await.unwrap();
        assert_eq!(first.inserted, 0);
        assert_eq!(first.failed, 1);

        let second = engine.insert(&docs).await.unwrap();
        assert_eq!(second.inserted, 1);
        assert_eq!(second.skipped, 0);
        assert_eq!(second.chunks, 1);

        let answer = engine.query("Best beach?", QueryMode::Mix).await.unwrap();
        assert!(answer.contains("Clearwater Beach"));
    }

    #[tokio::test]
    async fn test_failed_batch_only_drops_its_documents() {
        // Batch size 1: the first document's batch fails, the rest succeed
        let flaky = FlakyEmbedder {
            failures_left: AtomicUsize::new(1),
        };
        let engine = VectorRagEngine::new(
            Arc::new(EchoModel),
            Arc::new(FallbackEmbedder::new(flaky)),
            Arc::new(MemoryVectorStore::new()),
        )
        .with_embedding_concurrency(1, 1);

        let report = engine.insert(&documents()).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.inserted, 2);
        assert_eq!(engine.store().chunk_count().await.unwrap(), 2);
        assert!(!engine.store().is_doc_indexed(&doc_key(&documents()[0])).await.unwrap());
    }

    #[tokio::test]
    async fn test_long_document_is_chunked_in_order() {
        let engine = engine_with(Arc::new(KeywordEmbedder)).with_chunker(TokenChunker::new(4, 0));
        let report = engine
            .insert(&["beach one two three casino five six seven museum".to_string()])
            .await
            .unwrap();
        assert_eq!(report.chunks, 3);

        let results = engine.store().search(&[0.0, 0.0, 1.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.chunk_order, 2);
        assert_eq!(results[0].chunk.content, "museum");
    }

    #[test]
    fn test_retrieval_limit_by_mode() {
        let engine = engine_with(Arc::new(KeywordEmbedder)).with_retrieval(20, 10, 0.2);
        assert_eq!(engine.retrieval_limit(QueryMode::Naive), 10);
        assert_eq!(engine.retrieval_limit(QueryMode::Mix), 20);
        assert_eq!(engine.retrieval_limit(QueryMode::Local), 20);
    }
}
