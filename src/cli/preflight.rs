//! Pre-flight checks before expensive operations.
//!
//! Validates configuration before starting operations that would otherwise
//! fail midway.

use crate::config::Settings;
use crate::error::Result;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Importing calls the embedding API.
    Import,
    /// Querying calls the embedding and chat APIs.
    Query,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Import | Operation::Query => {
            settings.llm.require_api_key()?;
        }
    }
    Ok(())
}
