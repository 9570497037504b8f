//! Core traits for serenity abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability: the local durable
//! store, the remote store, and the payload cipher are all injected into the
//! services that use them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// LOCAL STORE
// =============================================================================

/// Durable, device-local storage for recovery records and the offline sync
/// queue.
///
/// All record writes are upserts keyed by the record's UUID. List order is
/// each collection's natural presentation order: resolutions and check-ins
/// most-recent-first, follow-up tasks by scheduled time ascending, queue
/// items strictly FIFO.
///
/// Implemented by the SQLite primary store and by the JSON whole-collection
/// fallback used when the primary store cannot be opened.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Upsert a crisis resolution.
    async fn save_resolution(&self, record: &CrisisResolution) -> Result<()>;

    /// All crisis resolutions, most recent first.
    async fn list_resolutions(&self) -> Result<Vec<CrisisResolution>>;

    /// Upsert a check-in response.
    async fn save_check_in(&self, record: &CheckInResponse) -> Result<()>;

    /// All check-in responses, most recent first.
    async fn list_check_ins(&self) -> Result<Vec<CheckInResponse>>;

    /// Upsert a follow-up task.
    async fn save_follow_up(&self, record: &FollowUpTask) -> Result<()>;

    /// All follow-up tasks, by scheduled time ascending.
    async fn list_follow_ups(&self) -> Result<Vec<FollowUpTask>>;

    /// Replace every collection with the given snapshot (post-sync mirror
    /// of the remote store).
    async fn replace_all(&self, snapshot: &RecoverySnapshot) -> Result<()>;

    /// Drop all records and the pending queue.
    async fn clear_all(&self) -> Result<()>;

    /// Append an operation to the back of the sync queue.
    async fn push_op(&self, item: &SyncQueueItem) -> Result<()>;

    /// All pending operations in FIFO order.
    async fn pending_ops(&self) -> Result<Vec<SyncQueueItem>>;

    /// Remove every pending operation. Called only after a fully
    /// successful drain.
    async fn clear_ops(&self) -> Result<()>;

    /// Number of pending operations.
    async fn queue_len(&self) -> Result<usize>;
}

// =============================================================================
// REMOTE STORE
// =============================================================================

/// User-scoped client of the authoritative remote store.
///
/// Inserts carry the full record including its client-generated UUID, and
/// MUST be idempotent by that id: re-applying an insert that already landed
/// is a no-op. This is what makes the at-least-once queue drain safe.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn insert_resolution(&self, record: &CrisisResolution) -> Result<()>;

    async fn insert_check_in(&self, record: &CheckInResponse) -> Result<()>;

    async fn insert_follow_up(&self, record: &FollowUpTask) -> Result<()>;

    /// Patch a follow-up task owned by `user_id`. Last write wins.
    async fn update_follow_up(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: &FollowUpTaskUpdate,
    ) -> Result<()>;

    /// All of the user's crisis resolutions, most recent first.
    async fn list_resolutions(&self, user_id: Uuid) -> Result<Vec<CrisisResolution>>;

    /// All of the user's check-in responses, most recent first.
    async fn list_check_ins(&self, user_id: Uuid) -> Result<Vec<CheckInResponse>>;

    /// All of the user's follow-up tasks, by scheduled time ascending.
    async fn list_follow_ups(&self, user_id: Uuid) -> Result<Vec<FollowUpTask>>;

    /// Create or replace the user's encrypted crisis plan.
    async fn upsert_plan(&self, plan: &EncryptedCrisisPlan) -> Result<()>;

    /// The user's encrypted crisis plan, if one exists.
    async fn fetch_plan(&self, user_id: Uuid) -> Result<Option<EncryptedCrisisPlan>>;

    /// Append an audit event. Append-only; never read back by this client.
    async fn insert_audit_event(&self, event: &AuditEvent) -> Result<()>;
}

// =============================================================================
// PAYLOAD CIPHER
// =============================================================================

/// Authenticated encryption over opaque string payloads.
///
/// The two deployment variants share this contract: the local variant holds
/// the secret in-process, the remote variant forwards to a server that holds
/// it. Callers pass JSON-serialized sensitive records and get back a
/// self-describing base64 envelope; decryption of a tampered or truncated
/// envelope fails without returning partial data.
#[async_trait]
pub trait PayloadCipher: Send + Sync {
    /// Encrypt a UTF-8 plaintext into a base64 envelope. Non-deterministic:
    /// two calls on the same plaintext yield different envelopes.
    async fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a base64 envelope produced by `encrypt`.
    async fn decrypt(&self, envelope: &str) -> Result<String>;
}
