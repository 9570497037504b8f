//! Local SQLite connection pool management.

use std::path::Path;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use serenity_core::defaults::LOCAL_POOL_MAX_CONNECTIONS;
use serenity_core::{Error, Result};

/// Default connection acquire timeout in seconds.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Pool configuration options.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Connection acquire timeout duration.
    pub acquire_timeout: Duration,
    /// Create the database file if it does not exist.
    pub create_if_missing: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: LOCAL_POOL_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            create_if_missing: true,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of connections.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Set the connection acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Create a SQLite pool over a database file with default configuration.
pub async fn create_pool(path: &Path) -> Result<SqlitePool> {
    create_pool_with_config(path, PoolConfig::default()).await
}

/// Create a SQLite pool over a database file with custom configuration.
pub async fn create_pool_with_config(path: &Path, config: PoolConfig) -> Result<SqlitePool> {
    let start = Instant::now();

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(config.create_if_missing)
        // WAL keeps reads open while the sync drain writes
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(config.acquire_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "store",
        component = "pool",
        op = "established",
        path = %path.display(),
        max_connections = config.max_connections,
        duration_ms = start.elapsed().as_millis() as u64,
        "Local database pool established"
    );
    Ok(pool)
}

/// Create an in-memory SQLite pool (for testing).
///
/// Pinned to a single connection: each in-memory SQLite connection is its
/// own database, so a larger pool would see different schemas per handle.
pub async fn create_in_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new().in_memory(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(Error::Database)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_builder() {
        let config = PoolConfig::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(5));

        assert_eq!(config.max_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert!(config.create_if_missing);
    }

    #[tokio::test]
    async fn test_in_memory_pool_connects() {
        let pool = create_in_memory_pool().await.unwrap();
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
    }
}
