//! Embedded schema for the local store.
//!
//! The schema is a single idempotent batch run at connect time. The local
//! store mirrors the remote collections the sync layer reasons about, plus
//! the pending-operation queue; it is not a general migration system.

use sqlx::SqlitePool;

use serenity_core::{Error, Result};

/// Create tables and indexes if they do not exist.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS crisis_resolutions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            interventions_used TEXT NOT NULL,
            effectiveness_rating INTEGER,
            notes TEXT,
            resolved_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_resolutions_resolved_at
            ON crisis_resolutions(resolved_at);

        CREATE TABLE IF NOT EXISTS check_in_responses (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            mood_rating INTEGER NOT NULL,
            safety_rating INTEGER,
            needs_support INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_check_ins_created_at
            ON check_in_responses(created_at);

        CREATE TABLE IF NOT EXISTS follow_up_tasks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            task_type TEXT NOT NULL,
            scheduled_for TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_follow_ups_scheduled_for
            ON follow_up_tasks(scheduled_for);

        CREATE TABLE IF NOT EXISTS sync_queue (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            payload TEXT NOT NULL,
            queued_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    Ok(())
}
