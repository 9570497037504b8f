//! Append-only encrypted audit trail.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use serenity_core::{AuditEvent, PayloadCipher, RemoteStore};

/// Records security-relevant events with their detail encrypted.
///
/// Auditing must never break the user workflow: every failure here is
/// logged and absorbed, and callers get no result to check.
pub struct AuditService {
    user_id: Uuid,
    remote: Arc<dyn RemoteStore>,
    cipher: Arc<dyn PayloadCipher>,
}

impl AuditService {
    pub fn new(
        user_id: Uuid,
        remote: Arc<dyn RemoteStore>,
        cipher: Arc<dyn PayloadCipher>,
    ) -> Self {
        Self {
            user_id,
            remote,
            cipher,
        }
    }

    /// Append an event. `action` is a coarse name safe for plaintext
    /// storage; `detail` is JSON that gets encrypted before it leaves this
    /// process.
    pub async fn record(&self, action: &str, detail: &serde_json::Value) {
        let encrypted = match self.cipher.encrypt(&detail.to_string()).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "audit",
                    op = "record",
                    action,
                    error = %e,
                    "Failed to encrypt audit detail, event dropped"
                );
                return;
            }
        };

        let event = AuditEvent {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            action: action.to_string(),
            detail: encrypted,
            created_at: Utc::now(),
        };

        if let Err(e) = self.remote.insert_audit_event(&event).await {
            warn!(
                subsystem = "sync",
                component = "audit",
                op = "record",
                action,
                error = %e,
                "Failed to append audit event"
            );
        }
    }
}
