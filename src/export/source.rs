//! Place sources for the export path.
//!
//! The filter is expressed once and rendered both as SQL (for Postgres) and
//! as an in-process predicate (for [`MemoryPlaceSource`]), so both sources
//! select and order rows identically.

use crate::error::Result;
use crate::place::PlaceRecord;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

/// Columns selected for export. Numeric columns are cast so decoding does
/// not depend on whether the table stores NUMERIC, REAL or INTEGER.
const SELECT_COLUMNS: &str = "google_place_id, name, city, state, \
     latitude::float8 AS latitude, longitude::float8 AS longitude, \
     rating::float8 AS rating, reviews_count::int8 AS reviews_count, \
     price_level::int8 AS price_level, google_types, primary_category, \
     editorial_summary, llm_description, llm_tags";

/// Export filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFilter {
    /// Exact-match city filter.
    pub city: Option<String>,
    /// Maximum number of rows to export.
    pub limit: Option<usize>,
    pub min_rating: f64,
    pub min_reviews: i64,
}

impl Default for ExportFilter {
    fn default() -> Self {
        Self {
            city: None,
            limit: None,
            min_rating: 3.0,
            min_reviews: 10,
        }
    }
}

impl ExportFilter {
    /// Whether a record passes the filter (ignores the limit).
    pub fn matches(&self, place: &PlaceRecord) -> bool {
        let rating_ok = place.rating.is_some_and(|r| r >= self.min_rating);
        let reviews_ok = place.reviews_count.is_some_and(|n| n >= self.min_reviews);
        let city_ok = match &self.city {
            Some(city) => place.city.as_deref() == Some(city.as_str()),
            None => true,
        };
        rating_ok && reviews_ok && city_ok
    }

    /// Total to report for `matching` filtered rows, capped by the limit.
    pub fn reported_total(&self, matching: u64) -> u64 {
        match self.limit {
            Some(limit) => matching.min(limit as u64),
            None => matching,
        }
    }
}

/// A filter together with its rendered SQL.
///
/// Parameters: `$1` min rating, `$2` min reviews, then city (if set), then
/// limit (if set, data query only).
#[derive(Debug, Clone)]
pub struct ExportQuery {
    pub filter: ExportFilter,
    predicate: String,
    data_sql: String,
    count_sql: String,
}

impl ExportQuery {
    pub fn new(filter: ExportFilter) -> Self {
        let mut predicate =
            "rating IS NOT NULL AND rating >= $1 AND reviews_count >= $2".to_string();
        let mut next_param = 3;
        if filter.city.is_some() {
            predicate.push_str(" AND city = $3");
            next_param = 4;
        }

        let count_sql = format!("SELECT COUNT(*) FROM places WHERE {}", predicate);

        let mut data_sql = format!(
            "SELECT {} FROM places WHERE {} ORDER BY reviews_count DESC",
            SELECT_COLUMNS, predicate
        );
        if filter.limit.is_some() {
            data_sql.push_str(&format!(" LIMIT ${}", next_param));
        }

        Self {
            filter,
            predicate,
            data_sql,
            count_sql,
        }
    }

    /// The shared WHERE predicate.
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Filtered, ordered, optionally limited SELECT.
    pub fn data_sql(&self) -> &str {
        &self.data_sql
    }

    /// COUNT over the same predicate, without ORDER or LIMIT.
    pub fn count_sql(&self) -> &str {
        &self.count_sql
    }
}

/// A store of place records that can be counted and streamed.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Count rows matching the filter, ignoring the limit.
    async fn count(&self, query: &ExportQuery) -> Result<u64>;

    /// Stream matching rows by descending review count, honoring the limit.
    fn fetch<'a>(&'a self, query: &'a ExportQuery) -> BoxStream<'a, Result<PlaceRecord>>;
}

/// In-memory place source.
///
/// Useful for testing and small datasets.
pub struct MemoryPlaceSource {
    places: Vec<PlaceRecord>,
}

impl MemoryPlaceSource {
    pub fn new(places: Vec<PlaceRecord>) -> Self {
        Self { places }
    }
}

#[async_trait]
impl PlaceSource for MemoryPlaceSource {
    async fn count(&self, query: &ExportQuery) -> Result<u64> {
        Ok(self.places.iter().filter(|p| query.filter.matches(p)).count() as u64)
    }

    fn fetch<'a>(&'a self, query: &'a ExportQuery) -> BoxStream<'a, Result<PlaceRecord>> {
        let mut matching: Vec<&PlaceRecord> = self
            .places
            .iter()
            .filter(|p| query.filter.matches(p))
            .collect();
        matching.sort_by(|a, b| b.reviews_count.cmp(&a.reviews_count));
        if let Some(limit) = query.filter.limit {
            matching.truncate(limit);
        }

        stream::iter(matching.into_iter().cloned().map(Ok)).boxed()
    }
}
