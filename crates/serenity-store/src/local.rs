//! `LocalStore` implementations and the primary-then-fallback constructor.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use serenity_core::defaults::{FALLBACK_DIR, LOCAL_DB_FILE};
use serenity_core::{
    CheckInResponse, CrisisResolution, FollowUpTask, LocalStore, RecoverySnapshot, Result,
    SyncQueueItem,
};

use crate::fallback::JsonFallbackStore;
use crate::LocalDatabase;

/// The primary `LocalStore`: SQLite repositories behind one pool.
pub struct SqliteLocalStore {
    db: LocalDatabase,
}

impl SqliteLocalStore {
    pub fn new(db: LocalDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn save_resolution(&self, record: &CrisisResolution) -> Result<()> {
        self.db.resolutions.save(record).await
    }

    async fn list_resolutions(&self) -> Result<Vec<CrisisResolution>> {
        self.db.resolutions.list().await
    }

    async fn save_check_in(&self, record: &CheckInResponse) -> Result<()> {
        self.db.check_ins.save(record).await
    }

    async fn list_check_ins(&self) -> Result<Vec<CheckInResponse>> {
        self.db.check_ins.list().await
    }

    async fn save_follow_up(&self, record: &FollowUpTask) -> Result<()> {
        self.db.follow_ups.save(record).await
    }

    async fn list_follow_ups(&self) -> Result<Vec<FollowUpTask>> {
        self.db.follow_ups.list().await
    }

    async fn replace_all(&self, snapshot: &RecoverySnapshot) -> Result<()> {
        self.db.resolutions.clear().await?;
        for record in &snapshot.resolutions {
            self.db.resolutions.save(record).await?;
        }
        self.db.check_ins.clear().await?;
        for record in &snapshot.check_in_responses {
            self.db.check_ins.save(record).await?;
        }
        self.db.follow_ups.clear().await?;
        for record in &snapshot.follow_up_tasks {
            self.db.follow_ups.save(record).await?;
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.db.resolutions.clear().await?;
        self.db.check_ins.clear().await?;
        self.db.follow_ups.clear().await?;
        self.db.queue.clear().await
    }

    async fn push_op(&self, item: &SyncQueueItem) -> Result<()> {
        self.db.queue.push(item).await
    }

    async fn pending_ops(&self) -> Result<Vec<SyncQueueItem>> {
        self.db.queue.pending().await
    }

    async fn clear_ops(&self) -> Result<()> {
        self.db.queue.clear().await
    }

    async fn queue_len(&self) -> Result<usize> {
        self.db.queue.len().await
    }
}

#[async_trait]
impl LocalStore for JsonFallbackStore {
    async fn save_resolution(&self, record: &CrisisResolution) -> Result<()> {
        JsonFallbackStore::save_resolution(self, record).await
    }

    async fn list_resolutions(&self) -> Result<Vec<CrisisResolution>> {
        JsonFallbackStore::list_resolutions(self).await
    }

    async fn save_check_in(&self, record: &CheckInResponse) -> Result<()> {
        JsonFallbackStore::save_check_in(self, record).await
    }

    async fn list_check_ins(&self) -> Result<Vec<CheckInResponse>> {
        JsonFallbackStore::list_check_ins(self).await
    }

    async fn save_follow_up(&self, record: &FollowUpTask) -> Result<()> {
        JsonFallbackStore::save_follow_up(self, record).await
    }

    async fn list_follow_ups(&self) -> Result<Vec<FollowUpTask>> {
        JsonFallbackStore::list_follow_ups(self).await
    }

    async fn replace_all(&self, snapshot: &RecoverySnapshot) -> Result<()> {
        JsonFallbackStore::replace_all(self, snapshot).await
    }

    async fn clear_all(&self) -> Result<()> {
        JsonFallbackStore::clear_all(self).await
    }

    async fn push_op(&self, item: &SyncQueueItem) -> Result<()> {
        JsonFallbackStore::push_op(self, item).await
    }

    async fn pending_ops(&self) -> Result<Vec<SyncQueueItem>> {
        JsonFallbackStore::pending_ops(self).await
    }

    async fn clear_ops(&self) -> Result<()> {
        JsonFallbackStore::clear_ops(self).await
    }

    async fn queue_len(&self) -> Result<usize> {
        JsonFallbackStore::queue_len(self).await
    }
}

/// Open the local store for a data directory: SQLite first, JSON
/// whole-collection fallback when the primary store cannot be opened.
pub async fn open_local_store(data_dir: &Path) -> Result<Arc<dyn LocalStore>> {
    tokio::fs::create_dir_all(data_dir).await?;

    match LocalDatabase::connect(&data_dir.join(LOCAL_DB_FILE)).await {
        Ok(db) => {
            info!(
                subsystem = "store",
                component = "local",
                op = "open",
                backend = "sqlite",
                "Local store opened"
            );
            Ok(Arc::new(SqliteLocalStore::new(db)))
        }
        Err(e) => {
            warn!(
                subsystem = "store",
                component = "local",
                op = "open",
                backend = "fallback",
                error = %e,
                "Primary local store unavailable, using JSON fallback"
            );
            let fallback = JsonFallbackStore::open(data_dir.join(FALLBACK_DIR)).await?;
            Ok(Arc::new(fallback))
        }
    }
}
