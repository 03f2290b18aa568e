//! Export command: filtered places from PostgreSQL to JSONL documents.

use crate::cli::Output;
use crate::config::Settings;
use crate::export::{export_places, ExportFilter, ExportQuery, PostgresPlaceSource};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

/// Options for the export command.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub city: Option<String>,
    /// `None` or `Some(0)` exports every matching row.
    pub limit: Option<usize>,
    pub output: PathBuf,
    pub min_rating: f64,
    pub min_reviews: i64,
    pub batch_size: usize,
}

impl ExportOptions {
    fn query(&self) -> ExportQuery {
        ExportQuery::new(ExportFilter {
            city: self.city.clone(),
            limit: self.limit.filter(|&n| n > 0),
            min_rating: self.min_rating,
            min_reviews: self.min_reviews,
        })
    }
}

/// Run the export command.
pub async fn run_export(options: ExportOptions, settings: &Settings) -> Result<()> {
    let query = options.query();
    info!(
        "Exporting places (city: {}, min rating: {}, min reviews: {})",
        options.city.as_deref().unwrap_or("all"),
        options.min_rating,
        options.min_reviews
    );

    let source = PostgresPlaceSource::connect(&settings.postgres).await?;
    let progress = Output::progress_bar(0, "Exporting places");

    let result = export_places(
        &source,
        &query,
        &options.output,
        options.batch_size,
        &progress,
    )
    .await;

    source.close().await;

    match result {
        Ok(stats) => {
            progress.finish_and_clear();
            Output::success(&format!(
                "Exported {} places to {}",
                stats.total_records,
                options.output.display()
            ));
            Output::export_stats(&stats, &options.output);
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            error!("Export failed: {}", e);
            Output::error(&format!("Export failed: {}", e));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(limit: Option<usize>) -> ExportOptions {
        ExportOptions {
            city: Some("Tampa".to_string()),
            limit,
            output: PathBuf::from("data/places_export.jsonl"),
            min_rating: 3.0,
            min_reviews: 10,
            batch_size: 100,
        }
    }

    #[test]
    fn test_zero_limit_means_no_cap() {
        let query = options(Some(0)).query();
        assert!(query.filter.limit.is_none());
        assert!(!query.data_sql().contains("LIMIT"));
    }

    #[test]
    fn test_limit_and_city_in_sql() {
        let query = options(Some(50)).query();
        assert!(query.data_sql().ends_with("LIMIT $4"));
        assert!(query.count_sql().contains("city = $3"));
    }
}
