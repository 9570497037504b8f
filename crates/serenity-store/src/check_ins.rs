//! Check-in-response repository for the local store.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use serenity_core::{CheckInResponse, Error, Result};

use crate::resolutions::parse_uuid;

/// SQLite-backed storage for check-in responses, most-recent-first.
#[derive(Clone)]
pub struct SqliteCheckInRepository {
    pool: SqlitePool,
}

impl SqliteCheckInRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a check-in response by id.
    pub async fn save(&self, record: &CheckInResponse) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO check_in_responses
                   (id, user_id, mood_rating, safety_rating, needs_support, notes, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               ON CONFLICT(id) DO UPDATE SET
                   mood_rating = excluded.mood_rating,
                   safety_rating = excluded.safety_rating,
                   needs_support = excluded.needs_support,
                   notes = excluded.notes"#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.mood_rating)
        .bind(record.safety_rating)
        .bind(record.needs_support)
        .bind(&record.notes)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    /// All check-in responses, most recent first.
    pub async fn list(&self) -> Result<Vec<CheckInResponse>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, mood_rating, safety_rating, needs_support, notes, created_at
               FROM check_in_responses
               ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|row| {
                let id: String = row.get("id");
                let user_id: String = row.get("user_id");
                Ok(CheckInResponse {
                    id: parse_uuid(&id)?,
                    user_id: parse_uuid(&user_id)?,
                    mood_rating: row.get("mood_rating"),
                    safety_rating: row.get("safety_rating"),
                    needs_support: row.get("needs_support"),
                    notes: row.get("notes"),
                    created_at: row.get::<DateTime<Utc>, _>("created_at"),
                })
            })
            .collect()
    }

    /// Remove every check-in response.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM check_in_responses")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
