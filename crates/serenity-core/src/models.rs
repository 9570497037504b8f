//! Domain models for serenity recovery data.
//!
//! Records carry a client-generated UUID identity from the moment they are
//! created, online or offline, and keep it for life. The remote store
//! accepts that UUID as the permanent primary key, so a record created
//! offline is never renumbered when it syncs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// CRISIS RESOLUTION
// =============================================================================

/// Outcome record written when a crisis episode is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisResolution {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Interventions the user reported using (grounding, breathing, contact...).
    pub interventions_used: Vec<String>,
    /// Self-reported effectiveness, 1–5.
    pub effectiveness_rating: Option<i32>,
    pub notes: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

/// Caller-provided fields for a new crisis resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCrisisResolution {
    pub interventions_used: Vec<String>,
    pub effectiveness_rating: Option<i32>,
    pub notes: Option<String>,
}

impl CrisisResolution {
    /// Materialize a full record from caller input, minting the client id
    /// and the resolution timestamp.
    pub fn new(user_id: Uuid, input: NewCrisisResolution) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            interventions_used: input.interventions_used,
            effectiveness_rating: input.effectiveness_rating,
            notes: input.notes,
            resolved_at: Utc::now(),
        }
    }
}

// =============================================================================
// CHECK-IN RESPONSE
// =============================================================================

/// A completed daily (or crisis follow-up) check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Mood rating, 1–10.
    pub mood_rating: i32,
    /// Perceived safety rating, 1–10. Absent for routine check-ins.
    pub safety_rating: Option<i32>,
    pub needs_support: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-provided fields for a new check-in response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCheckInResponse {
    pub mood_rating: i32,
    pub safety_rating: Option<i32>,
    pub needs_support: bool,
    pub notes: Option<String>,
}

impl CheckInResponse {
    pub fn new(user_id: Uuid, input: NewCheckInResponse) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            mood_rating: input.mood_rating,
            safety_rating: input.safety_rating,
            needs_support: input.needs_support,
            notes: input.notes,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// FOLLOW-UP TASK
// =============================================================================

/// A scheduled follow-up (mood assessment, safety check, reach-out reminder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpTask {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Task kind, e.g. "mood_assessment", "safety_check".
    pub task_type: String,
    pub scheduled_for: DateTime<Utc>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Caller-provided fields for a new follow-up task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFollowUpTask {
    pub task_type: String,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

/// Partial update applied to an existing follow-up task.
///
/// `None` fields are left untouched, and are omitted from the wire form so
/// a remote PATCH never nulls a field the caller did not set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpTaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl FollowUpTask {
    pub fn new(user_id: Uuid, input: NewFollowUpTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            task_type: input.task_type,
            scheduled_for: input.scheduled_for,
            completed: input.completed,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &FollowUpTaskUpdate) {
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(scheduled_for) = update.scheduled_for {
            self.scheduled_for = scheduled_for;
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = Some(completed_at);
        }
    }
}

// =============================================================================
// CRISIS PLAN
// =============================================================================

/// Plaintext body of a user's crisis plan. Never stored or transmitted
/// as-is: it is JSON-serialized and passed through a `PayloadCipher`
/// before it reaches any store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrisisPlan {
    #[serde(default)]
    pub personal_triggers: Vec<String>,
    #[serde(default)]
    pub warning_signs: Vec<String>,
    #[serde(default)]
    pub coping_strategies: Vec<String>,
    #[serde(default)]
    pub safe_environment_steps: Vec<String>,
    /// People the user trusts to call, as free-form "name / phone" entries.
    #[serde(default)]
    pub support_contacts: Vec<String>,
}

/// Ciphertext form of a crisis plan as held by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedCrisisPlan {
    pub user_id: Uuid,
    /// Base64 envelope produced by a `PayloadCipher`.
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// AUDIT EVENT
// =============================================================================

/// Security-relevant event appended to the audit trail. The detail field
/// is an encrypted envelope; the action name is deliberately coarse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Coarse action name, e.g. "crisis_plan_saved", "sync_completed".
    pub action: String,
    /// Encrypted envelope holding the event detail JSON.
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// SYNC QUEUE
// =============================================================================

/// A write captured while offline, reified as data so it can be persisted
/// and replayed against the remote store in FIFO order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SyncOperation {
    CrisisResolution(CrisisResolution),
    CheckInResponse(CheckInResponse),
    FollowUpTask(FollowUpTask),
    UpdateFollowUpTask {
        id: Uuid,
        update: FollowUpTaskUpdate,
    },
}

impl SyncOperation {
    /// Short operation name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncOperation::CrisisResolution(_) => "crisis_resolution",
            SyncOperation::CheckInResponse(_) => "check_in_response",
            SyncOperation::FollowUpTask(_) => "follow_up_task",
            SyncOperation::UpdateFollowUpTask { .. } => "update_follow_up_task",
        }
    }
}

/// Queue entry: the operation plus the moment it was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncQueueItem {
    #[serde(flatten)]
    pub op: SyncOperation,
    pub queued_at: DateTime<Utc>,
}

impl SyncQueueItem {
    pub fn new(op: SyncOperation) -> Self {
        Self {
            op,
            queued_at: Utc::now(),
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Everything the UI needs, in presentation order: resolutions and
/// check-ins most-recent-first, follow-up tasks by scheduled time ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoverySnapshot {
    pub resolutions: Vec<CrisisResolution>,
    pub check_in_responses: Vec<CheckInResponse>,
    pub follow_up_tasks: Vec<FollowUpTask>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resolution_mints_id_and_timestamp() {
        let user = Uuid::new_v4();
        let rec = CrisisResolution::new(
            user,
            NewCrisisResolution {
                interventions_used: vec!["breathing".into()],
                effectiveness_rating: Some(4),
                notes: None,
            },
        );
        assert_eq!(rec.user_id, user);
        assert!(!rec.id.is_nil());
        assert_eq!(rec.interventions_used, vec!["breathing".to_string()]);
    }

    #[test]
    fn test_follow_up_apply_partial_update() {
        let mut task = FollowUpTask::new(
            Uuid::new_v4(),
            NewFollowUpTask {
                task_type: "mood_assessment".into(),
                scheduled_for: Utc::now(),
                completed: false,
            },
        );

        let done_at = Utc::now();
        task.apply(&FollowUpTaskUpdate {
            completed: Some(true),
            scheduled_for: None,
            completed_at: Some(done_at),
        });

        assert!(task.completed);
        assert_eq!(task.completed_at, Some(done_at));
        assert_eq!(task.task_type, "mood_assessment");
    }

    #[test]
    fn test_sync_operation_wire_shape() {
        let user = Uuid::new_v4();
        let rec = CheckInResponse::new(
            user,
            NewCheckInResponse {
                mood_rating: 7,
                safety_rating: None,
                needs_support: false,
                notes: None,
            },
        );
        let item = SyncQueueItem::new(SyncOperation::CheckInResponse(rec));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "check_in_response");
        assert!(json["data"]["id"].is_string());
        assert!(json["queued_at"].is_string());

        let back: SyncQueueItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_sync_operation_kind() {
        let op = SyncOperation::UpdateFollowUpTask {
            id: Uuid::new_v4(),
            update: FollowUpTaskUpdate::default(),
        };
        assert_eq!(op.kind(), "update_follow_up_task");
    }

    #[test]
    fn test_crisis_plan_roundtrips_through_json() {
        let plan = CrisisPlan {
            personal_triggers: vec!["arguments".into()],
            warning_signs: vec!["isolation".into()],
            ..Default::default()
        };
        let json = serde_json::to_string(&plan).unwrap();
        let back: CrisisPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }
}
