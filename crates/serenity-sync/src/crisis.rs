//! Crisis-plan storage with encrypt-before-store.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use serenity_core::{CrisisPlan, EncryptedCrisisPlan, PayloadCipher, RemoteStore, Result};

use crate::audit::AuditService;

/// Saves and loads a user's crisis plan. The plan body is JSON-serialized
/// and passed through the injected [`PayloadCipher`] before it reaches the
/// remote store; the store only ever holds envelopes.
pub struct CrisisPlanService {
    user_id: Uuid,
    remote: Arc<dyn RemoteStore>,
    cipher: Arc<dyn PayloadCipher>,
    audit: Option<Arc<AuditService>>,
}

impl CrisisPlanService {
    pub fn new(
        user_id: Uuid,
        remote: Arc<dyn RemoteStore>,
        cipher: Arc<dyn PayloadCipher>,
    ) -> Self {
        Self {
            user_id,
            remote,
            cipher,
            audit: None,
        }
    }

    /// Attach an audit trail; plan saves and loads get recorded.
    pub fn with_audit(mut self, audit: Arc<AuditService>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Encrypt and store the plan, replacing any previous version.
    pub async fn save(&self, plan: &CrisisPlan) -> Result<()> {
        let json = serde_json::to_string(plan)?;
        let payload = self.cipher.encrypt(&json).await?;

        self.remote
            .upsert_plan(&EncryptedCrisisPlan {
                user_id: self.user_id,
                payload,
                updated_at: Utc::now(),
            })
            .await?;

        if let Some(audit) = &self.audit {
            audit
                .record(
                    "crisis_plan_saved",
                    &serde_json::json!({
                        "trigger_count": plan.personal_triggers.len(),
                        "contact_count": plan.support_contacts.len(),
                    }),
                )
                .await;
        }
        Ok(())
    }

    /// Fetch and decrypt the user's plan. `None` when no plan exists,
    /// including when asking for another user's data, which the store
    /// scopes away rather than erroring.
    pub async fn load(&self) -> Result<Option<CrisisPlan>> {
        let Some(encrypted) = self.remote.fetch_plan(self.user_id).await? else {
            return Ok(None);
        };

        let json = self.cipher.decrypt(&encrypted.payload).await.map_err(|e| {
            // Surface the category only; the envelope contents and the
            // crypto detail stay out of anything user-visible
            warn!(
                subsystem = "sync",
                component = "crisis_plan",
                op = "load",
                error = %e,
                "Crisis plan decryption failed"
            );
            e
        })?;

        let plan = serde_json::from_str(&json)?;

        if let Some(audit) = &self.audit {
            audit
                .record("crisis_plan_accessed", &serde_json::json!({}))
                .await;
        }
        Ok(Some(plan))
    }
}
