//! Crisis-resolution repository for the local store.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use serenity_core::{CrisisResolution, Error, Result};

/// SQLite-backed storage for crisis resolutions, most-recent-first.
#[derive(Clone)]
pub struct SqliteResolutionRepository {
    pool: SqlitePool,
}

impl SqliteResolutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a resolution by id.
    pub async fn save(&self, record: &CrisisResolution) -> Result<()> {
        let interventions = serde_json::to_string(&record.interventions_used)?;

        sqlx::query(
            r#"INSERT INTO crisis_resolutions
                   (id, user_id, interventions_used, effectiveness_rating, notes, resolved_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
               ON CONFLICT(id) DO UPDATE SET
                   interventions_used = excluded.interventions_used,
                   effectiveness_rating = excluded.effectiveness_rating,
                   notes = excluded.notes,
                   resolved_at = excluded.resolved_at"#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(interventions)
        .bind(record.effectiveness_rating)
        .bind(&record.notes)
        .bind(record.resolved_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    /// All resolutions, most recent first.
    pub async fn list(&self) -> Result<Vec<CrisisResolution>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, interventions_used, effectiveness_rating, notes, resolved_at
               FROM crisis_resolutions
               ORDER BY resolved_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(parse_row).collect()
    }

    /// Remove every resolution.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM crisis_resolutions")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

fn parse_row(row: sqlx::sqlite::SqliteRow) -> Result<CrisisResolution> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let interventions: String = row.get("interventions_used");

    Ok(CrisisResolution {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        interventions_used: serde_json::from_str(&interventions)?,
        effectiveness_rating: row.get("effectiveness_rating"),
        notes: row.get("notes"),
        resolved_at: row.get::<DateTime<Utc>, _>("resolved_at"),
    })
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Store(format!("invalid uuid in local store: {e}")))
}
