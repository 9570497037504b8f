//! Persistent FIFO queue of pending sync operations.

use sqlx::{Row, SqlitePool};
use tracing::debug;

use serenity_core::defaults::SYNC_QUEUE_CAP;
use serenity_core::{Error, Result, SyncQueueItem};

/// SQLite-backed FIFO queue. Ordering comes from the autoincrement `seq`
/// column; the queue is only ever appended to, read whole, or cleared
/// whole. Per-item removal does not exist because a drain is
/// all-or-nothing.
#[derive(Clone)]
pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an operation to the back of the queue.
    pub async fn push(&self, item: &SyncQueueItem) -> Result<()> {
        let pending = self.len().await?;
        if pending >= SYNC_QUEUE_CAP {
            return Err(Error::Store(format!(
                "sync queue is full ({pending} pending operations)"
            )));
        }

        let payload = serde_json::to_string(item)?;

        sqlx::query("INSERT INTO sync_queue (payload, queued_at) VALUES (?1, ?2)")
            .bind(payload)
            .bind(item.queued_at)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "store",
            component = "queue",
            op = "push",
            queue_len = pending + 1,
            kind = item.op.kind(),
            "Operation queued for sync"
        );
        Ok(())
    }

    /// All pending operations in FIFO order.
    pub async fn pending(&self) -> Result<Vec<SyncQueueItem>> {
        let rows = sqlx::query("SELECT payload FROM sync_queue ORDER BY seq ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.into_iter()
            .map(|row| {
                let payload: String = row.get("payload");
                serde_json::from_str(&payload).map_err(Into::into)
            })
            .collect()
    }

    /// Remove every pending operation.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM sync_queue")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Number of pending operations.
    pub async fn len(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sync_queue")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_in_memory_pool;
    use crate::schema::ensure_schema;
    use serenity_core::{CheckInResponse, NewCheckInResponse, SyncOperation};
    use uuid::Uuid;

    async fn repo() -> SqliteQueueRepository {
        let pool = create_in_memory_pool().await.unwrap();
        ensure_schema(&pool).await.unwrap();
        SqliteQueueRepository::new(pool)
    }

    fn check_in_item(mood: i32) -> SyncQueueItem {
        SyncQueueItem::new(SyncOperation::CheckInResponse(CheckInResponse::new(
            Uuid::new_v4(),
            NewCheckInResponse {
                mood_rating: mood,
                ..Default::default()
            },
        )))
    }

    #[tokio::test]
    async fn test_push_and_pending_preserve_fifo_order() {
        let repo = repo().await;

        let first = check_in_item(1);
        let second = check_in_item(2);
        let third = check_in_item(3);

        repo.push(&first).await.unwrap();
        repo.push(&second).await.unwrap();
        repo.push(&third).await.unwrap();

        let pending = repo.pending().await.unwrap();
        assert_eq!(pending, vec![first, second, third]);
        assert_eq!(repo.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_clear_empties_queue() {
        let repo = repo().await;
        repo.push(&check_in_item(5)).await.unwrap();

        repo.clear().await.unwrap();

        assert_eq!(repo.len().await.unwrap(), 0);
        assert!(repo.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_survives_reread() {
        // Queue contents come back identical after a second read: nothing
        // is consumed by reading.
        let repo = repo().await;
        let item = check_in_item(7);
        repo.push(&item).await.unwrap();

        assert_eq!(repo.pending().await.unwrap(), vec![item.clone()]);
        assert_eq!(repo.pending().await.unwrap(), vec![item]);
    }
}
