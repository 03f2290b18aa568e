//! Convert command: JSON array of places to JSONL documents.

use crate::cli::Output;
use crate::export::{convert_json_to_jsonl, default_output_path};
use anyhow::Result;
use std::path::Path;
use tracing::error;

/// Run the convert command.
pub fn run_convert(input: &Path, output: Option<&Path>) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));

    let progress = Output::progress_bar(0, "Converting places");

    match convert_json_to_jsonl(input, &output, &progress) {
        Ok(stats) => {
            progress.finish_and_clear();
            Output::success(&format!(
                "Converted {} places to {}",
                stats.total_records,
                output.display()
            ));
            Output::export_stats(&stats, &output);
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            error!("Conversion failed: {}", e);
            Output::error(&format!("Conversion failed: {}", e));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_writes_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("places.json");
        std::fs::write(
            &input,
            r#"[{"google_place_id": "ChIJ1", "name": "Pier 60", "city": "Clearwater", "state": "FL"}]"#,
        )
        .unwrap();

        run_convert(&input, None).unwrap();

        let written = std::fs::read_to_string(dir.path().join("places.jsonl")).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.contains(r#""doc_id":"ChIJ1""#));
    }

    #[test]
    fn test_convert_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_convert(&dir.path().join("absent.json"), None).is_err());
    }
}
