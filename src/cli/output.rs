//! CLI output formatting utilities.

use crate::export::ExportStats;
use crate::ingest::IngestStats;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print export or conversion statistics.
    pub fn export_stats(stats: &ExportStats, output: &std::path::Path) {
        Output::header("Export statistics");
        Output::kv("Records", &stats.total_records.to_string());
        Output::kv("Total content length", &format!("{} chars", stats.total_size));
        Output::kv(
            "Average content length",
            &format!("{:.1} chars", stats.avg_content_length),
        );
        Output::kv("Duration", &format!("{:.2}s", stats.duration_secs));

        let size = std::fs::metadata(output)
            .map(|m| format_file_size(m.len()))
            .unwrap_or_else(|_| "unknown".to_string());
        Output::kv("Output file", &format!("{} ({})", output.display(), size));
    }

    /// Print ingestion statistics.
    pub fn ingest_stats(stats: &IngestStats) {
        Output::header("Import statistics");
        Output::kv("Documents", &stats.total.to_string());
        Output::kv("Indexed", &stats.report.inserted.to_string());
        Output::kv("Already indexed", &stats.report.skipped.to_string());
        if stats.report.failed > 0 {
            Output::kv("Embedding failed", &stats.report.failed.to_string());
        }
        Output::kv("Chunks written", &stats.report.chunks.to_string());
        Output::kv("Duration", &format!("{:.2}s", stats.duration_secs));
        Output::kv("Speed", &format!("{:.2} docs/sec", stats.speed));
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("#>-"));
        }
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format a byte count as B, KB or MB.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let size = bytes as f64;
    if size < KB {
        format!("{} B", bytes)
    } else if size < KB * KB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / (KB * KB))
    }
}
