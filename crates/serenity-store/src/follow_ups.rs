//! Follow-up-task repository for the local store.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use serenity_core::{Error, FollowUpTask, FollowUpTaskUpdate, Result};

use crate::resolutions::parse_uuid;

/// SQLite-backed storage for follow-up tasks, ordered by scheduled time.
#[derive(Clone)]
pub struct SqliteFollowUpRepository {
    pool: SqlitePool,
}

impl SqliteFollowUpRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a follow-up task by id.
    pub async fn save(&self, record: &FollowUpTask) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO follow_up_tasks
                   (id, user_id, task_type, scheduled_for, completed, completed_at, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               ON CONFLICT(id) DO UPDATE SET
                   task_type = excluded.task_type,
                   scheduled_for = excluded.scheduled_for,
                   completed = excluded.completed,
                   completed_at = excluded.completed_at"#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(&record.task_type)
        .bind(record.scheduled_for)
        .bind(record.completed)
        .bind(record.completed_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    /// Apply a partial update to a stored task. Missing ids are a no-op:
    /// the optimistic in-memory update already happened and the queue
    /// carries the authoritative patch.
    pub async fn update(&self, id: Uuid, update: &FollowUpTaskUpdate) -> Result<()> {
        sqlx::query(
            r#"UPDATE follow_up_tasks SET
                   completed = COALESCE(?2, completed),
                   scheduled_for = COALESCE(?3, scheduled_for),
                   completed_at = COALESCE(?4, completed_at)
               WHERE id = ?1"#,
        )
        .bind(id.to_string())
        .bind(update.completed)
        .bind(update.scheduled_for)
        .bind(update.completed_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    /// All follow-up tasks, by scheduled time ascending.
    pub async fn list(&self) -> Result<Vec<FollowUpTask>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, task_type, scheduled_for, completed, completed_at, created_at
               FROM follow_up_tasks
               ORDER BY scheduled_for ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|row| {
                let id: String = row.get("id");
                let user_id: String = row.get("user_id");
                Ok(FollowUpTask {
                    id: parse_uuid(&id)?,
                    user_id: parse_uuid(&user_id)?,
                    task_type: row.get("task_type"),
                    scheduled_for: row.get::<DateTime<Utc>, _>("scheduled_for"),
                    completed: row.get("completed"),
                    completed_at: row.get::<Option<DateTime<Utc>>, _>("completed_at"),
                    created_at: row.get::<DateTime<Utc>, _>("created_at"),
                })
            })
            .collect()
    }

    /// Remove every follow-up task.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM follow_up_tasks")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_in_memory_pool;
    use crate::schema::ensure_schema;
    use serenity_core::NewFollowUpTask;

    async fn repo() -> SqliteFollowUpRepository {
        let pool = create_in_memory_pool().await.unwrap();
        ensure_schema(&pool).await.unwrap();
        SqliteFollowUpRepository::new(pool)
    }

    fn task_at(user: Uuid, offset_hours: i64) -> FollowUpTask {
        FollowUpTask::new(
            user,
            NewFollowUpTask {
                task_type: "mood_assessment".into(),
                scheduled_for: Utc::now() + chrono::Duration::hours(offset_hours),
                completed: false,
            },
        )
    }

    #[tokio::test]
    async fn test_list_orders_by_scheduled_time_ascending() {
        let repo = repo().await;
        let user = Uuid::new_v4();

        let later = task_at(user, 48);
        let sooner = task_at(user, 1);

        repo.save(&later).await.unwrap();
        repo.save(&sooner).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed[0].id, sooner.id);
        assert_eq!(listed[1].id, later.id);
    }

    #[tokio::test]
    async fn test_update_applies_partial_fields() {
        let repo = repo().await;
        let task = task_at(Uuid::new_v4(), 2);
        repo.save(&task).await.unwrap();

        let done_at = Utc::now();
        repo.update(
            task.id,
            &FollowUpTaskUpdate {
                completed: Some(true),
                scheduled_for: None,
                completed_at: Some(done_at),
            },
        )
        .await
        .unwrap();

        let listed = repo.list().await.unwrap();
        assert!(listed[0].completed);
        assert!(listed[0].completed_at.is_some());
        assert_eq!(listed[0].task_type, "mood_assessment");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let repo = repo().await;
        repo.update(
            Uuid::new_v4(),
            &FollowUpTaskUpdate {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }
}
