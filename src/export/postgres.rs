//! `places` table source backed by PostgreSQL.

use super::source::{ExportQuery, PlaceSource};
use crate::config::PostgresSettings;
use crate::db;
use crate::error::{Result, TravelRagError};
use crate::place::PlaceRecord;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Row};
use tracing::{info, instrument};

impl FromRow<'_, PgRow> for PlaceRecord {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(PlaceRecord {
            google_place_id: row.try_get("google_place_id")?,
            name: row.try_get("name")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            primary_category: row.try_get("primary_category")?,
            google_types: row.try_get("google_types")?,
            rating: row.try_get("rating")?,
            reviews_count: row.try_get("reviews_count")?,
            price_level: row.try_get("price_level")?,
            editorial_summary: row.try_get("editorial_summary")?,
            llm_description: row.try_get("llm_description")?,
            llm_tags: row.try_get("llm_tags")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
        })
    }
}

/// Reads places from the `places` table over a single connection.
pub struct PostgresPlaceSource {
    pool: PgPool,
}

impl PostgresPlaceSource {
    /// Connect with a single pooled connection.
    pub async fn connect(settings: &PostgresSettings) -> Result<Self> {
        let pool = db::connect(settings, 1).await?;
        Ok(Self { pool })
    }

    /// Close the connection. Call on every exit path.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}

#[async_trait]
impl PlaceSource for PostgresPlaceSource {
    #[instrument(skip_all)]
    async fn count(&self, query: &ExportQuery) -> Result<u64> {
        let filter = &query.filter;
        let mut count = sqlx::query_scalar::<_, i64>(query.count_sql())
            .bind(filter.min_rating)
            .bind(filter.min_reviews);
        if let Some(city) = &filter.city {
            count = count.bind(city.as_str());
        }

        let total = count.fetch_one(&self.pool).await?;
        Ok(total.max(0) as u64)
    }

    fn fetch<'a>(&'a self, query: &'a ExportQuery) -> BoxStream<'a, Result<PlaceRecord>> {
        let filter = &query.filter;
        let mut rows = sqlx::query_as::<_, PlaceRecord>(query.data_sql())
            .bind(filter.min_rating)
            .bind(filter.min_reviews);
        if let Some(city) = &filter.city {
            rows = rows.bind(city.as_str());
        }
        if let Some(limit) = filter.limit {
            rows = rows.bind(limit as i64);
        }

        rows.fetch(&self.pool).map_err(TravelRagError::from).boxed()
    }
}
