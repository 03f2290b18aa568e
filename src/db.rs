//! PostgreSQL connection handling.

use crate::config::PostgresSettings;
use crate::error::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{error, info};

/// Open a pool against the configured database.
///
/// The ETL commands run one query cycle at a time, so callers usually ask
/// for a single connection.
pub async fn connect(settings: &PostgresSettings, max_connections: u32) -> Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.database);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Database connection failed: {}", e);
            e
        })?;

    info!("Successfully connected to database: {}", settings.database);
    Ok(pool)
}

/// Check that the database answers a trivial query.
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
