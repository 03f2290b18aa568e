//! travel-rag - Travel planner knowledge base
//!
//! ETL and query tooling for a retrieval-augmented-generation knowledge base
//! of places (attractions, restaurants, hotels) backed by PostgreSQL.
//!
//! # Overview
//!
//! travel-rag allows you to:
//! - Convert JSON arrays of places into JSONL documents
//! - Export filtered places from PostgreSQL into JSONL documents
//! - Import documents into a vector knowledge base (pgvector or local SQLite)
//! - Ask questions answered from the knowledge base by an OpenAI-compatible LLM
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `place` - Place records, description generation and source readers
//! - `export` - Document writer, convert and database export pipelines
//! - `ingest` - Batch ingestion into the knowledge base
//! - `chunking` - Token-window chunking
//! - `embedding` - Embedding generation
//! - `llm` - Chat completion
//! - `vector_store` - Vector database abstraction
//! - `rag` - RAG engine for ingestion and question answering
//!
//! # Example
//!
//! ```rust,no_run
//! use travel_rag::config::Settings;
//! use travel_rag::rag::{QueryMode, RagEngine, StoreBackend, VectorRagEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine =
//!         VectorRagEngine::from_settings(&settings, StoreBackend::Postgres, &settings.working_dir())
//!             .await?;
//!
//!     let answer = engine.query("Family-friendly beaches near Tampa?", QueryMode::Mix).await?;
//!     println!("{}", answer);
//!
//!     engine.finalize().await;
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod export;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod openai;
pub mod place;
pub mod rag;
pub mod vector_store;

pub use error::{Result, TravelRagError};
