//! Error types for travel-rag.

use thiserror::Error;

/// Library-level error type for travel-rag operations.
#[derive(Error, Debug)]
pub enum TravelRagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("Local store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("LLM API error: {0}")]
    OpenAI(String),
}

impl TravelRagError {
    /// The upstream service's own message, without this crate's prefix.
    pub fn upstream_message(&self) -> String {
        match self {
            TravelRagError::OpenAI(message) => message.clone(),
            TravelRagError::Http(e) => e.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this error is caused by bad input data rather than an upstream service.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, TravelRagError::MalformedInput(_) | TravelRagError::Json(_))
    }
}

/// Result type alias for travel-rag operations.
pub type Result<T> = std::result::Result<T, TravelRagError>;
