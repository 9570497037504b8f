//! HTTP client for the hosted remote store.
//!
//! Speaks the managed backend's REST dialect: one route per table,
//! `eq.`-prefixed filters, `order=` query parameters, and `Prefer` headers
//! for conflict handling. Only this module knows that dialect; the rest of
//! the system sees the `RemoteStore` trait.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use serenity_core::defaults::REMOTE_TIMEOUT_SECS;
use serenity_core::{
    AuditEvent, CheckInResponse, CrisisResolution, EncryptedCrisisPlan, Error, FollowUpTask,
    FollowUpTaskUpdate, RemoteStore, Result,
};

const RESOLUTIONS_TABLE: &str = "crisis_resolutions";
const CHECK_INS_TABLE: &str = "check_in_responses";
const FOLLOW_UPS_TABLE: &str = "follow_up_tasks";
const PLANS_TABLE: &str = "crisis_plans";
const AUDIT_TABLE: &str = "audit_events";

/// Remote store over the hosted REST API.
pub struct HttpRemoteStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRemoteStore {
    /// Build a client for the given REST base URL (e.g. `https://.../rest/v1`)
    /// and bearer credential.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REMOTE_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Remote(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    /// Idempotent insert: duplicate client ids are ignored by the server,
    /// so a replayed drain is a no-op for rows that already landed.
    async fn insert<T: Serialize>(&self, table: &str, record: &T) -> Result<()> {
        let response = self
            .http
            .post(self.table_url(table))
            .bearer_auth(&self.token)
            .header("Prefer", "resolution=ignore-duplicates")
            .json(&[record])
            .send()
            .await?;

        Self::ok_or_remote(response, table, "insert").await
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        user_id: Uuid,
        order: &str,
    ) -> Result<Vec<T>> {
        let response = self
            .http
            .get(self.table_url(table))
            .bearer_auth(&self.token)
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("order", order.to_string()),
                ("select", "*".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Remote(format!(
                "select from {table} failed with status {}",
                response.status()
            )));
        }
        response.json().await.map_err(Into::into)
    }

    async fn ok_or_remote(response: reqwest::Response, table: &str, op: &str) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Remote(format!(
                "{op} on {table} failed with status {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn insert_resolution(&self, record: &CrisisResolution) -> Result<()> {
        self.insert(RESOLUTIONS_TABLE, record).await
    }

    async fn insert_check_in(&self, record: &CheckInResponse) -> Result<()> {
        self.insert(CHECK_INS_TABLE, record).await
    }

    async fn insert_follow_up(&self, record: &FollowUpTask) -> Result<()> {
        self.insert(FOLLOW_UPS_TABLE, record).await
    }

    async fn update_follow_up(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: &FollowUpTaskUpdate,
    ) -> Result<()> {
        let response = self
            .http
            .patch(self.table_url(FOLLOW_UPS_TABLE))
            .bearer_auth(&self.token)
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{user_id}")),
            ])
            .json(update)
            .send()
            .await?;

        Self::ok_or_remote(response, FOLLOW_UPS_TABLE, "update").await
    }

    async fn list_resolutions(&self, user_id: Uuid) -> Result<Vec<CrisisResolution>> {
        self.select(RESOLUTIONS_TABLE, user_id, "resolved_at.desc")
            .await
    }

    async fn list_check_ins(&self, user_id: Uuid) -> Result<Vec<CheckInResponse>> {
        self.select(CHECK_INS_TABLE, user_id, "created_at.desc").await
    }

    async fn list_follow_ups(&self, user_id: Uuid) -> Result<Vec<FollowUpTask>> {
        self.select(FOLLOW_UPS_TABLE, user_id, "scheduled_for.asc")
            .await
    }

    async fn upsert_plan(&self, plan: &EncryptedCrisisPlan) -> Result<()> {
        let response = self
            .http
            .post(self.table_url(PLANS_TABLE))
            .bearer_auth(&self.token)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[plan])
            .send()
            .await?;

        Self::ok_or_remote(response, PLANS_TABLE, "upsert").await
    }

    async fn fetch_plan(&self, user_id: Uuid) -> Result<Option<EncryptedCrisisPlan>> {
        let mut plans: Vec<EncryptedCrisisPlan> =
            self.select(PLANS_TABLE, user_id, "updated_at.desc").await?;
        Ok(if plans.is_empty() {
            None
        } else {
            Some(plans.remove(0))
        })
    }

    async fn insert_audit_event(&self, event: &AuditEvent) -> Result<()> {
        let response = self
            .http
            .post(self.table_url(AUDIT_TABLE))
            .bearer_auth(&self.token)
            .json(&[event])
            .send()
            .await?;

        Self::ok_or_remote(response, AUDIT_TABLE, "insert").await
    }
}

impl std::fmt::Debug for HttpRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemoteStore")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let store = HttpRemoteStore::new("https://example.test/rest/v1/", "token").unwrap();
        assert_eq!(
            store.table_url("crisis_resolutions"),
            "https://example.test/rest/v1/crisis_resolutions"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let store = HttpRemoteStore::new("https://example.test", "super-secret").unwrap();
        let debug = format!("{:?}", store);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super-secret"));
    }
}
