//! Batch ingestion: JSONL documents into the RAG engine.

use crate::error::Result;
use crate::place::read_jsonl;
use crate::rag::{InsertReport, RagEngine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument};

/// One line of an import file. Only `content` is handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestDocument {
    pub doc_id: Option<String>,
    pub content: String,
    pub metadata: Option<Value>,
}

/// Throughput of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestStats {
    /// Documents handed to the engine.
    pub total: usize,
    pub report: InsertReport,
    pub duration_secs: f64,
    /// Documents per second, 0 when no time elapsed.
    pub speed: f64,
}

impl IngestStats {
    fn new(total: usize, report: InsertReport, duration_secs: f64) -> Self {
        let speed = if duration_secs > 0.0 {
            total as f64 / duration_secs
        } else {
            0.0
        };
        Self {
            total,
            report,
            duration_secs,
            speed,
        }
    }
}

/// Load import documents. A `limit` of `None` or `Some(0)` reads everything.
pub fn load_documents(path: &Path, limit: Option<usize>) -> Result<Vec<IngestDocument>> {
    info!("Loading documents from {}", path.display());
    let documents: Vec<IngestDocument> = read_jsonl(path, limit)?;
    info!("Loaded {} documents", documents.len());
    Ok(documents)
}

/// Hand all document contents to the engine in one insert call.
///
/// Engine errors are logged and returned; nothing is retried.
#[instrument(skip_all, fields(count = documents.len()))]
pub async fn ingest_documents(
    engine: &dyn RagEngine,
    documents: &[IngestDocument],
) -> Result<IngestStats> {
    let contents: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
    info!("Starting to insert {} documents", contents.len());

    let started = Instant::now();
    let report = engine.insert(&contents).await.map_err(|e| {
        error!("Error during document insertion: {}", e);
        e
    })?;
    let stats = IngestStats::new(contents.len(), report, started.elapsed().as_secs_f64());

    info!(
        "Inserted {} documents in {:.2}s ({:.2} docs/sec)",
        stats.total, stats.duration_secs, stats.speed
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TravelRagError;
    use crate::rag::QueryMode;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEngine {
        received: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl RagEngine for RecordingEngine {
        async fn insert(&self, contents: &[String]) -> Result<InsertReport> {
            if self.fail {
                return Err(TravelRagError::Rag("storage unavailable".to_string()));
            }
            self.received.lock().unwrap().extend(contents.iter().cloned());
            Ok(InsertReport {
                inserted: contents.len(),
                chunks: contents.len(),
                ..InsertReport::default()
            })
        }

        async fn query(&self, _question: &str, _mode: QueryMode) -> Result<String> {
            Ok(String::new())
        }
    }

    fn write_jsonl(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join("places_export.jsonl");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_load_documents_with_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jsonl(
            dir.path(),
            &[
                r#"{"doc_id":"ChIJ1","content":"Pier 60 is a attraction in FL Clearwater.","metadata":{"city":"Clearwater"}}"#,
                r#"{"content":"Only content."}"#,
            ],
        );

        let docs = load_documents(&path, None).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].doc_id.as_deref(), Some("ChIJ1"));
        assert!(docs[1].doc_id.is_none());
        assert!(docs[1].metadata.is_none());
    }

    #[test]
    fn test_load_documents_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jsonl(
            dir.path(),
            &[r#"{"content":"a"}"#, r#"{"content":"b"}"#, r#"{"content":"c"}"#],
        );
        assert_eq!(load_documents(&path, Some(2)).unwrap().len(), 2);
        assert_eq!(load_documents(&path, Some(0)).unwrap().len(), 3);
    }

    #[test]
    fn test_missing_content_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jsonl(dir.path(), &[r#"{"content":"a"}"#, r#"{"doc_id":"x"}"#]);
        let err = load_documents(&path, None).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_ingest_passes_contents_in_order() {
        let engine = RecordingEngine::default();
        let docs = vec![
            IngestDocument {
                doc_id: Some("1".to_string()),
                content: "first".to_string(),
                metadata: None,
            },
            IngestDocument {
                doc_id: None,
                content: "second".to_string(),
                metadata: None,
            },
        ];

        let stats = ingest_documents(&engine, &docs).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.report.inserted, 2);
        assert!(stats.speed >= 0.0);
        assert_eq!(*engine.received.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_ingest_propagates_engine_errors() {
        let engine = RecordingEngine {
            fail: true,
            ..Default::default()
        };
        let result = ingest_documents(&engine, &[]).await;
        assert!(matches!(result, Err(TravelRagError::Rag(_))));
    }

    #[test]
    fn test_speed_is_zero_without_elapsed_time() {
        let stats = IngestStats::new(5, InsertReport::default(), 0.0);
        assert_eq!(stats.speed, 0.0);
        let stats = IngestStats::new(10, InsertReport::default(), 4.0);
        assert_eq!(stats.speed, 2.5);
    }
}
