//! Configuration module for travel-rag.
//!
//! Handles loading application settings (TOML, `.env`, environment) and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, LlmSettings, PostgresSettings, PromptSettings,
    RagSettings, Settings,
};
