//! Configuration settings for travel-rag.
//!
//! Settings come from a TOML file (optional) and are then overridden by
//! environment variables, which may themselves come from a `.env` file.

use crate::error::{Result, TravelRagError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub postgres: PostgresSettings,
    pub rag: RagSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for log files. Empty disables file logging.
    pub log_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
        }
    }
}

/// Chat completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// API key (usually from `QWEN_API_KEY`).
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL.
    pub base_url: String,
    /// Chat model.
    pub model: String,
    /// Default sampling temperature.
    pub temperature: f32,
    /// Default completion token cap.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            model: "qwen-plus".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: None,
        }
    }
}

impl LlmSettings {
    /// The API key, or a configuration error when it is missing or empty.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(TravelRagError::Config(
                "QWEN_API_KEY not found in environment variables. Please create .env file."
                    .to_string(),
            )),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Maximum tokens per embedded text.
    pub max_token_size: usize,
    /// Texts per embedding request.
    pub batch_size: usize,
    /// Embedding requests in flight at once.
    pub max_async: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-v4".to_string(),
            dimensions: 1024,
            max_token_size: 8192,
            batch_size: 10,
            max_async: 16,
        }
    }
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Namespace for engine tables, so several knowledge bases can share a database.
    pub workspace: String,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "travel_kg".to_string(),
            workspace: "travel_planner".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

/// RAG engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Working directory for local (non-Postgres) storage.
    pub working_dir: String,
    /// Chunk window size in tokens.
    pub chunk_token_size: usize,
    /// Tokens shared between consecutive chunks.
    pub chunk_overlap_token_size: usize,
    /// Chunks retrieved for graph-oriented modes.
    pub top_k: usize,
    /// Chunks retrieved for naive mode.
    pub chunk_top_k: usize,
    /// Minimum cosine similarity for a retrieved chunk.
    pub cosine_better_than_threshold: f32,
    /// HNSW `m` parameter.
    pub hnsw_m: u32,
    /// HNSW `ef_construction` parameter.
    pub hnsw_ef: u32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            working_dir: "./travel_rag".to_string(),
            chunk_token_size: 1200,
            chunk_overlap_token_size: 100,
            top_k: 20,
            chunk_top_k: 10,
            cosine_better_than_threshold: 0.2,
            hnsw_m: 16,
            hnsw_ef: 64,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory holding a `rag.toml` that overrides the default prompts.
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file, then apply the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// A `.env` file in the working directory is loaded first; variables
    /// already set in the process environment win.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        dotenv::dotenv().ok();

        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else if path.is_some() {
            return Err(TravelRagError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        } else {
            Settings::default()
        };

        settings.apply_env_from(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Override settings from environment-style lookups.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QWEN_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = lookup("QWEN_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = lookup("POSTGRES_HOST") {
            self.postgres.host = v;
        }
        if let Some(port) = lookup("POSTGRES_PORT").and_then(|v| v.parse().ok()) {
            self.postgres.port = port;
        }
        if let Some(v) = lookup("POSTGRES_USER") {
            self.postgres.user = v;
        }
        if let Some(v) = lookup("POSTGRES_PASSWORD") {
            self.postgres.password = v;
        }
        if let Some(v) = lookup("POSTGRES_DB") {
            self.postgres.database = v;
        }
        if let Some(v) = lookup("LIGHTRAG_WORKSPACE") {
            self.postgres.workspace = v;
        }
        if let Some(v) = lookup("LIGHTRAG_WORKING_DIR") {
            self.rag.working_dir = v;
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("travel-rag")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded working directory.
    pub fn working_dir(&self) -> PathBuf {
        Self::expand_path(&self.rag.working_dir)
    }

    /// Get the expanded log directory, if file logging is enabled.
    pub fn log_dir(&self) -> Option<PathBuf> {
        if self.general.log_dir.trim().is_empty() {
            None
        } else {
            Some(Self::expand_path(&self.general.log_dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_deployment() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "qwen-plus");
        assert_eq!(settings.embedding.dimensions, 1024);
        assert_eq!(settings.postgres.port, 5432);
        assert_eq!(settings.postgres.database, "travel_kg");
        assert_eq!(settings.rag.chunk_token_size, 1200);
        assert_eq!(settings.rag.chunk_overlap_token_size, 100);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("QWEN_API_KEY", "sk-abc"),
            ("POSTGRES_PORT", "6543"),
            ("POSTGRES_DB", "kg"),
            ("LIGHTRAG_WORKSPACE", "ws"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.llm.require_api_key().unwrap(), "sk-abc");
        assert_eq!(settings.postgres.port, 6543);
        assert_eq!(settings.postgres.database, "kg");
        assert_eq!(settings.postgres.workspace, "ws");
        assert_eq!(settings.postgres.host, "localhost");
    }

    #[test]
    fn test_unparsable_port_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_env_from(|k| (k == "POSTGRES_PORT").then(|| "abc".to_string()));
        assert_eq!(settings.postgres.port, 5432);
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let settings = Settings::default();
        assert!(matches!(
            settings.llm.require_api_key(),
            Err(TravelRagError::Config(_))
        ));
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [rag]
            top_k = 5

            [postgres]
            host = "db.internal"
            "#,
        )
        .unwrap();
        assert_eq!(settings.rag.top_k, 5);
        assert_eq!(settings.rag.chunk_top_k, 10);
        assert_eq!(settings.postgres.host, "db.internal");
    }
}
