//! # serenity-store
//!
//! Local durable storage for serenity recovery data.
//!
//! This crate provides:
//! - A SQLite-backed primary store with one repository per collection
//!   (crisis resolutions, check-in responses, follow-up tasks)
//! - Persistent FIFO storage for the offline sync queue
//! - A JSON whole-collection fallback store used when SQLite cannot be
//!   opened
//! - The [`open_local_store`] constructor that picks between them
//!
//! ## Example
//!
//! ```rust,ignore
//! use serenity_store::LocalDatabase;
//!
//! let db = LocalDatabase::connect(&data_dir.join("serenity.db")).await?;
//! db.resolutions.save(&record).await?;
//! let recent = db.resolutions.list().await?;
//! ```

pub mod check_ins;
pub mod fallback;
pub mod follow_ups;
pub mod local;
pub mod pool;
pub mod queue;
pub mod resolutions;
pub mod schema;

// Re-export core types
pub use serenity_core::*;

// Re-export repository implementations
pub use check_ins::SqliteCheckInRepository;
pub use fallback::JsonFallbackStore;
pub use follow_ups::SqliteFollowUpRepository;
pub use local::{open_local_store, SqliteLocalStore};
pub use pool::{create_in_memory_pool, create_pool, create_pool_with_config, PoolConfig};
pub use queue::SqliteQueueRepository;
pub use resolutions::SqliteResolutionRepository;

use std::path::Path;

/// Combined local database context with all repositories.
#[derive(Clone)]
pub struct LocalDatabase {
    /// The underlying connection pool.
    pub pool: sqlx::SqlitePool,
    /// Crisis-resolution repository.
    pub resolutions: SqliteResolutionRepository,
    /// Check-in-response repository.
    pub check_ins: SqliteCheckInRepository,
    /// Follow-up-task repository.
    pub follow_ups: SqliteFollowUpRepository,
    /// Pending sync-operation queue.
    pub queue: SqliteQueueRepository,
}

impl LocalDatabase {
    /// Open the database file, ensure the schema, and build repositories.
    pub async fn connect(path: &Path) -> Result<Self> {
        let pool = create_pool(path).await?;
        Self::from_pool(pool).await
    }

    /// In-memory database (for testing).
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = create_in_memory_pool().await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: sqlx::SqlitePool) -> Result<Self> {
        schema::ensure_schema(&pool).await?;
        Ok(Self {
            resolutions: SqliteResolutionRepository::new(pool.clone()),
            check_ins: SqliteCheckInRepository::new(pool.clone()),
            follow_ups: SqliteFollowUpRepository::new(pool.clone()),
            queue: SqliteQueueRepository::new(pool.clone()),
            pool,
        })
    }
}

