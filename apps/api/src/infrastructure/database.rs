use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::domain::repositories::RepositoryResult;

/// Opens the SQLite connection pool
///
/// # Arguments
/// * `database_url` - e.g. `sqlite://turfhub.db?mode=rwc`
/// * `max_connections` - Upper bound of pooled connections
pub async fn init_pool(database_url: &str, max_connections: u32) -> RepositoryResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> RepositoryResult<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Fresh, migrated in-memory database
///
/// Uses a single connection kept alive for the pool's lifetime, since every
/// in-memory connection is its own database.
pub async fn in_memory_pool() -> RepositoryResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Current time as stored in the database (unix seconds)
pub fn timestamp_now() -> i64 {
    Utc::now().timestamp()
}

pub fn from_timestamp(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}
