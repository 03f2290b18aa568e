//! OpenAI-compatible client configuration (Qwen via DashScope by default).

use crate::config::LlmSettings;
use crate::error::{Result, TravelRagError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the configured endpoint.
///
/// Fails when no API key is configured, before any request is made.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let timeout = settings
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    create_client_with_timeout(settings, timeout)
}

/// Create a client with a custom timeout.
pub fn create_client_with_timeout(
    settings: &LlmSettings,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let api_key = settings.require_api_key()?;

    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(settings.base_url.clone());

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Map an API error into the library error type.
pub(crate) fn api_error(context: &str, e: impl std::fmt::Display) -> TravelRagError {
    TravelRagError::OpenAI(format!("{}: {}", context, e))
}
