//! The offline-first recovery-data service.
//!
//! One instance per authenticated session, constructed with its
//! collaborators injected (remote store, local store, connectivity watch).
//! Writes succeed immediately regardless of connectivity:
//!
//! - **Online**: the write goes to the remote store and is mirrored into
//!   the local store (write-through cache).
//! - **Offline**, or when a nominally-online remote write fails: the
//!   write lands in the local store and is appended to the durable FIFO
//!   sync queue for replay.
//!
//! On reconnect (or an explicit [`RecoveryService::sync`] call) the queue
//! is drained strictly sequentially against the remote store. The first
//! failure aborts the drain and leaves the whole queue intact; only a
//! fully successful drain clears it, after which local state is refreshed
//! from the remote store, the post-sync source of truth. Inserts are
//! idempotent by client id, so re-applying the already-landed prefix of an
//! aborted drain is harmless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use serenity_core::{
    CheckInResponse, CrisisResolution, FollowUpTask, FollowUpTaskUpdate, LocalStore,
    NewCheckInResponse, NewCrisisResolution, NewFollowUpTask, RecoverySnapshot, RemoteStore,
    Result, SyncOperation, SyncQueueItem,
};

use crate::connectivity::ConnectivityWatch;

/// Offline-first facade over the user's recovery data.
pub struct RecoveryService {
    user_id: Uuid,
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    connectivity: ConnectivityWatch,
    state: RwLock<RecoverySnapshot>,
    loading: AtomicBool,
}

impl RecoveryService {
    /// Build a service for one authenticated user session.
    pub fn new(
        user_id: Uuid,
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        connectivity: ConnectivityWatch,
    ) -> Self {
        Self {
            user_id,
            remote,
            local,
            connectivity,
            state: RwLock::new(RecoverySnapshot::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Current connectivity flag, for UI feedback.
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Whether a `load_all` is in flight, for UI feedback.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// A clone of the in-memory session state.
    pub async fn snapshot(&self) -> RecoverySnapshot {
        self.state.read().await.clone()
    }

    /// Load every collection: from the remote store when online (mirroring
    /// into the local store), from the local store otherwise. A remote
    /// failure while nominally online degrades to the local read instead
    /// of surfacing.
    pub async fn load_all(&self) -> Result<RecoverySnapshot> {
        self.loading.store(true, Ordering::Release);
        let result = self.load_all_inner().await;
        self.loading.store(false, Ordering::Release);
        result
    }

    async fn load_all_inner(&self) -> Result<RecoverySnapshot> {
        let start = Instant::now();

        if self.connectivity.is_online() {
            match self.load_from_remote().await {
                Ok(snapshot) => {
                    if let Err(e) = self.local.replace_all(&snapshot).await {
                        warn!(
                            subsystem = "sync",
                            component = "recovery_service",
                            op = "load_all",
                            error = %e,
                            "Failed to mirror remote data into local store"
                        );
                    }
                    *self.state.write().await = snapshot.clone();
                    info!(
                        subsystem = "sync",
                        component = "recovery_service",
                        op = "load_all",
                        source = "remote",
                        record_count = snapshot.resolutions.len()
                            + snapshot.check_in_responses.len()
                            + snapshot.follow_up_tasks.len(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Loaded recovery data"
                    );
                    return Ok(snapshot);
                }
                Err(e) => {
                    // Remote unreachable is equivalent to offline for
                    // data-availability purposes
                    warn!(
                        subsystem = "sync",
                        component = "recovery_service",
                        op = "load_all",
                        error = %e,
                        "Remote load failed, reading local store"
                    );
                }
            }
        }

        let snapshot = RecoverySnapshot {
            resolutions: self.local.list_resolutions().await?,
            check_in_responses: self.local.list_check_ins().await?,
            follow_up_tasks: self.local.list_follow_ups().await?,
        };
        *self.state.write().await = snapshot.clone();
        info!(
            subsystem = "sync",
            component = "recovery_service",
            op = "load_all",
            source = "local",
            duration_ms = start.elapsed().as_millis() as u64,
            "Loaded recovery data"
        );
        Ok(snapshot)
    }

    async fn load_from_remote(&self) -> Result<RecoverySnapshot> {
        Ok(RecoverySnapshot {
            resolutions: self.remote.list_resolutions(self.user_id).await?,
            check_in_responses: self.remote.list_check_ins(self.user_id).await?,
            follow_up_tasks: self.remote.list_follow_ups(self.user_id).await?,
        })
    }

    /// Record a crisis resolution. Returns the record with its
    /// client-generated id; it is already visible in the session state.
    pub async fn save_crisis_resolution(
        &self,
        input: NewCrisisResolution,
    ) -> Result<CrisisResolution> {
        let record = CrisisResolution::new(self.user_id, input);

        self.state
            .write()
            .await
            .resolutions
            .insert(0, record.clone());
        self.write_through(SyncOperation::CrisisResolution(record.clone()))
            .await?;

        Ok(record)
    }

    /// Record a check-in response.
    pub async fn save_check_in_response(
        &self,
        input: NewCheckInResponse,
    ) -> Result<CheckInResponse> {
        let record = CheckInResponse::new(self.user_id, input);

        self.state
            .write()
            .await
            .check_in_responses
            .insert(0, record.clone());
        self.write_through(SyncOperation::CheckInResponse(record.clone()))
            .await?;

        Ok(record)
    }

    /// Schedule a follow-up task. Session state stays sorted by scheduled
    /// time ascending rather than most-recent-first.
    pub async fn save_follow_up_task(&self, input: NewFollowUpTask) -> Result<FollowUpTask> {
        let record = FollowUpTask::new(self.user_id, input);

        {
            let mut state = self.state.write().await;
            state.follow_up_tasks.push(record.clone());
            state
                .follow_up_tasks
                .sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for));
        }
        self.write_through(SyncOperation::FollowUpTask(record.clone()))
            .await?;

        Ok(record)
    }

    /// Patch a follow-up task. The session state and local mirror are
    /// updated immediately (optimistic update) on both paths.
    pub async fn update_follow_up_task(
        &self,
        id: Uuid,
        update: FollowUpTaskUpdate,
    ) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if let Some(task) = state.follow_up_tasks.iter_mut().find(|t| t.id == id) {
                task.apply(&update);
            }
            state
                .follow_up_tasks
                .sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for));
        }
        self.write_through(SyncOperation::UpdateFollowUpTask { id, update })
            .await
    }

    /// The one place online/offline branching happens for writes.
    ///
    /// Online: apply remotely, then mirror locally (write-through cache).
    /// Offline, or when the remote write fails: mirror locally and append
    /// to the sync queue. Local persistence failure is the only error that
    /// propagates; the optimistic in-memory write has already happened,
    /// so the caller can tell the user without losing data.
    async fn write_through(&self, op: SyncOperation) -> Result<()> {
        if self.connectivity.is_online() {
            match self.apply_remote(&op).await {
                Ok(()) => {
                    self.mirror_local(&op).await?;
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        subsystem = "sync",
                        component = "recovery_service",
                        op = "write_through",
                        kind = op.kind(),
                        error = %e,
                        "Remote write failed, queueing for sync"
                    );
                }
            }
        } else {
            debug!(
                subsystem = "sync",
                component = "recovery_service",
                op = "write_through",
                kind = op.kind(),
                online = false,
                "Offline, queueing for sync"
            );
        }

        self.mirror_local(&op).await?;
        self.local.push_op(&SyncQueueItem::new(op)).await
    }

    /// Map a queued operation onto the remote-store call it stands for.
    async fn apply_remote(&self, op: &SyncOperation) -> Result<()> {
        match op {
            SyncOperation::CrisisResolution(record) => self.remote.insert_resolution(record).await,
            SyncOperation::CheckInResponse(record) => self.remote.insert_check_in(record).await,
            SyncOperation::FollowUpTask(record) => self.remote.insert_follow_up(record).await,
            SyncOperation::UpdateFollowUpTask { id, update } => {
                self.remote.update_follow_up(self.user_id, *id, update).await
            }
        }
    }

    async fn mirror_local(&self, op: &SyncOperation) -> Result<()> {
        match op {
            SyncOperation::CrisisResolution(record) => self.local.save_resolution(record).await,
            SyncOperation::CheckInResponse(record) => self.local.save_check_in(record).await,
            SyncOperation::FollowUpTask(record) => self.local.save_follow_up(record).await,
            SyncOperation::UpdateFollowUpTask { id, .. } => {
                // Persist the already-updated in-memory record
                let state = self.state.read().await;
                match state.follow_up_tasks.iter().find(|t| t.id == *id) {
                    Some(task) => self.local.save_follow_up(task).await,
                    None => Ok(()),
                }
            }
        }
    }

    /// Drain the sync queue. No-op when offline or the queue is empty.
    ///
    /// Replay is strictly sequential FIFO. The first failure aborts the
    /// drain and returns the error with the queue untouched; the next call
    /// retries from the front. Only after every item lands is the queue
    /// cleared, followed by a refresh from the remote store.
    pub async fn sync(&self) -> Result<()> {
        if !self.connectivity.is_online() {
            debug!(
                subsystem = "sync",
                component = "recovery_service",
                op = "sync",
                online = false,
                "Skipping sync while offline"
            );
            return Ok(());
        }

        let pending = self.local.pending_ops().await?;
        if pending.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        info!(
            subsystem = "sync",
            component = "recovery_service",
            op = "sync",
            queue_len = pending.len(),
            "Draining sync queue"
        );

        let mut drained = 0usize;
        for item in &pending {
            if let Err(e) = self.apply_remote(&item.op).await {
                warn!(
                    subsystem = "sync",
                    component = "recovery_service",
                    op = "sync",
                    drained,
                    queue_len = pending.len(),
                    kind = item.op.kind(),
                    error = %e,
                    "Drain aborted, queue left intact"
                );
                return Err(e);
            }
            drained += 1;
        }

        self.local.clear_ops().await?;
        info!(
            subsystem = "sync",
            component = "recovery_service",
            op = "sync",
            drained,
            duration_ms = start.elapsed().as_millis() as u64,
            "Sync queue drained"
        );

        // Remote is the post-sync source of truth
        self.load_all().await?;
        Ok(())
    }

    /// Number of operations waiting for sync.
    pub async fn pending_sync_ops(&self) -> Result<usize> {
        self.local.queue_len().await
    }

    /// Watch connectivity and drain the queue on every offline→online
    /// transition. Sync failures are logged and absorbed; the queue stays
    /// for the next transition or explicit call.
    pub fn spawn_auto_sync(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let service = self;
        let mut rx = service.connectivity.subscribe();
        tokio::spawn(async move {
            let mut was_online = *rx.borrow();
            while rx.changed().await.is_ok() {
                let online = *rx.borrow();
                if online && !was_online {
                    if let Err(e) = service.sync().await {
                        warn!(
                            subsystem = "sync",
                            component = "recovery_service",
                            op = "auto_sync",
                            error = %e,
                            "Reconnect sync failed, will retry on next transition"
                        );
                    }
                }
                was_online = online;
            }
        })
    }
}

impl std::fmt::Debug for RecoveryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryService")
            .field("user_id", &self.user_id)
            .field("online", &self.is_online())
            .finish()
    }
}
