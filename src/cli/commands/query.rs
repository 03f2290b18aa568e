//! Query command: one question against the knowledge base.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::logging::Verbosity;
use crate::rag::{QueryMode, RagEngine, StoreBackend, VectorRagEngine};
use anyhow::Result;
use tracing::{error, info};

/// Run the query command.
///
/// Without `-v` only the answer reaches the terminal.
pub async fn run_query(
    question: &str,
    mode: QueryMode,
    local: bool,
    verbosity: Verbosity,
    settings: &Settings,
) -> Result<()> {
    preflight::check(Operation::Query, settings)?;

    let backend = if local {
        StoreBackend::Local
    } else {
        StoreBackend::Postgres
    };
    let engine = VectorRagEngine::from_settings(settings, backend, &settings.working_dir()).await?;

    info!("Query: {} (mode: {})", question, mode);
    let spinner = (!verbosity.is_quiet()).then(|| Output::spinner("Searching knowledge base..."));

    let result = engine.query(question, mode).await;
    engine.finalize().await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match result {
        Ok(answer) => {
            if !verbosity.is_quiet() {
                Output::header("Answer");
            }
            println!("{}", answer);
            Ok(())
        }
        Err(e) => {
            error!("Query failed: {}", e);
            Err(e.into())
        }
    }
}
