//! Import command: JSONL documents into the knowledge base.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::ingest::{ingest_documents, load_documents};
use crate::rag::{RagEngine, StoreBackend, VectorRagEngine};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Run the import command.
pub async fn run_import(
    input: &Path,
    limit: Option<usize>,
    working_dir: Option<PathBuf>,
    use_postgres: bool,
    settings: &Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Import, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'travel-rag doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let documents = load_documents(input, limit)?;
    if documents.is_empty() {
        Output::warning(&format!("No documents found in {}", input.display()));
        return Ok(());
    }

    let working_dir = working_dir.unwrap_or_else(|| settings.working_dir());
    let backend = if use_postgres {
        StoreBackend::Postgres
    } else {
        StoreBackend::Local
    };
    info!("Initializing RAG engine ({:?}) in {}", backend, working_dir.display());

    let engine = VectorRagEngine::from_settings(settings, backend, &working_dir).await?;

    let spinner = Output::spinner(&format!("Indexing {} documents...", documents.len()));
    let result = ingest_documents(&engine, &documents).await;
    let totals = if result.is_ok() {
        store_totals(&engine).await
    } else {
        None
    };
    engine.finalize().await;

    match result {
        Ok(stats) => {
            spinner.finish_and_clear();
            Output::success("Import completed");
            Output::ingest_stats(&stats);
            if let Some((documents, chunks)) = totals {
                Output::kv(
                    "Knowledge base",
                    &format!("{} documents, {} chunks", documents, chunks),
                );
            }
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Import failed: {}", e);
            Output::error(&format!("Import failed: {}", e));
            Err(e.into())
        }
    }
}

/// Documents and chunks now in the store, if they can be read.
async fn store_totals(engine: &VectorRagEngine) -> Option<(usize, usize)> {
    let store = engine.store();
    match tokio::try_join!(store.document_count(), store.chunk_count()) {
        Ok(totals) => Some(totals),
        Err(e) => {
            warn!("Could not read knowledge base totals: {}", e);
            None
        }
    }
}
