//! JSONL document writer with running statistics.

use crate::error::Result;
use crate::place::GeneratedDocument;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Statistics for one convert/export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportStats {
    /// Documents written.
    pub total_records: usize,
    /// Sum of content lengths, in characters.
    pub total_size: usize,
    /// Average content length in characters (0 when nothing was written).
    pub avg_content_length: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Elapsed seconds between start and finish.
    pub duration_secs: f64,
}

/// Writes one compact JSON document per line.
pub struct DocumentWriter<W: Write> {
    out: BufWriter<W>,
    flush_every: Option<usize>,
    total_records: usize,
    total_size: usize,
    started_at: DateTime<Utc>,
}

impl DocumentWriter<File> {
    /// Create (or truncate) the output file, creating parent directories.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> DocumentWriter<W> {
    /// Wrap a writer. The clock starts now.
    pub fn new(inner: W) -> Self {
        Self {
            out: BufWriter::new(inner),
            flush_every: None,
            total_records: 0,
            total_size: 0,
            started_at: Utc::now(),
        }
    }

    /// Flush the underlying writer every `n` documents (0 disables).
    pub fn with_flush_every(mut self, n: usize) -> Self {
        self.flush_every = (n > 0).then_some(n);
        self
    }

    /// Write one document as a single line.
    pub fn write(&mut self, doc: &GeneratedDocument) -> Result<()> {
        serde_json::to_writer(&mut self.out, doc)?;
        self.out.write_all(b"\n")?;

        self.total_records += 1;
        self.total_size += doc.content_chars();

        if let Some(n) = self.flush_every {
            if self.total_records % n == 0 {
                self.out.flush()?;
                debug!("Flushed {} documents", self.total_records);
            }
        }
        Ok(())
    }

    /// Flush remaining output and compute the final statistics.
    pub fn finish(mut self) -> Result<ExportStats> {
        self.out.flush()?;

        let finished_at = Utc::now();
        let avg_content_length = if self.total_records > 0 {
            self.total_size as f64 / self.total_records as f64
        } else {
            0.0
        };
        let duration_secs = (finished_at - self.started_at).num_milliseconds() as f64 / 1000.0;

        Ok(ExportStats {
            total_records: self.total_records,
            total_size: self.total_size,
            avg_content_length,
            started_at: self.started_at,
            finished_at,
            duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::PlaceRecord;

    fn doc(id: &str, name: &str) -> GeneratedDocument {
        let place = PlaceRecord {
            google_place_id: Some(id.to_string()),
            city: Some("Kyōto".to_string()),
            ..PlaceRecord::named(name)
        };
        GeneratedDocument::from_place(&place).unwrap()
    }

    #[test]
    fn test_writes_one_line_per_document() {
        let mut buffer = Vec::new();
        {
            let mut writer = DocumentWriter::new(&mut buffer);
            writer.write(&doc("a", "Temple")).unwrap();
            writer.write(&doc("b", "Garden")).unwrap();
            let stats = writer.finish().unwrap();
            assert_eq!(stats.total_records, 2);
        }

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(r#"{"doc_id":"a","content":"#));
        assert!(lines[0].contains("Kyōto"), "non-ASCII must stay unescaped");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_stats_arithmetic() {
        let first = doc("a", "Temple");
        let second = doc("b", "Garden");
        let expected_total = first.content_chars() + second.content_chars();

        let mut writer = DocumentWriter::new(Vec::new()).with_flush_every(1);
        writer.write(&first).unwrap();
        writer.write(&second).unwrap();
        let stats = writer.finish().unwrap();

        assert_eq!(stats.total_size, expected_total);
        assert!((stats.avg_content_length - expected_total as f64 / 2.0).abs() < 1e-9);
        assert!(stats.duration_secs >= 0.0);
        assert!(stats.finished_at >= stats.started_at);
    }

    #[test]
    fn test_empty_run_has_zero_average() {
        let stats = DocumentWriter::new(Vec::new()).finish().unwrap();
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.avg_content_length, 0.0);
    }

    #[test]
    fn test_create_makes_parent_dirs_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.jsonl");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale content that is long\n".repeat(10)).unwrap();

        let mut writer = DocumentWriter::create(&path).unwrap();
        writer.write(&doc("a", "Temple")).unwrap();
        writer.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!text.contains("stale"));

        let fresh = dir.path().join("a").join("b").join("out.jsonl");
        DocumentWriter::create(&fresh).unwrap().finish().unwrap();
        assert!(fresh.exists());
    }
}
