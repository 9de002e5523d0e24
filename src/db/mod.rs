/// Database layer
///
/// Owns the connection pool, the embedded schema migrations and the
/// statement timeout wrapper every repository call goes through.

pub mod models;

use crate::config::DatabaseConfig;
use crate::error::{ApiError, ApiResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

/// Create a SQLite connection pool
pub async fn create_pool(config: &DatabaseConfig) -> ApiResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(config.statement_timeout());

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.statement_timeout())
        .connect_with(options)
        .await?;

    tracing::info!(max_connections = config.max_connections, "Database pool ready");

    Ok(pool)
}

/// Single-connection in-memory pool with the schema applied
pub async fn connect_in_memory() -> ApiResult<SqlitePool> {
    // Every connection to :memory: is its own database, so pin the pool to one.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run migrations for a database
/// Migrations are embedded at compile time from ./migrations directory
pub async fn run_migrations(pool: &SqlitePool) -> ApiResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| ApiError::Internal(format!("Migration failed: {}", e)))?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> ApiResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Run a database future under a deadline.
///
/// Expiry surfaces as `ApiError::Timeout`, never retried.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> ApiResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ApiError::Timeout(limit)),
    }
}
