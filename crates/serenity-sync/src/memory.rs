//! In-process remote store.
//!
//! Backs the sync tests and local development without a network. Matches
//! the `RemoteStore` contract exactly, including idempotent insert by
//! client id, and adds scripted failure injection so drain-abort behavior
//! can be exercised deterministically.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use serenity_core::{
    AuditEvent, CheckInResponse, CrisisResolution, EncryptedCrisisPlan, Error, FollowUpTask,
    FollowUpTaskUpdate, RemoteStore, Result,
};

#[derive(Default)]
struct Inner {
    resolutions: HashMap<Uuid, CrisisResolution>,
    check_ins: HashMap<Uuid, CheckInResponse>,
    follow_ups: HashMap<Uuid, FollowUpTask>,
    plans: HashMap<Uuid, EncryptedCrisisPlan>,
    audit: Vec<AuditEvent>,
    /// Record ids in the order insert calls landed, for FIFO assertions.
    insert_log: Vec<Uuid>,
    insert_calls: usize,
    /// 1-based insert call number that should fail (once).
    fail_insert_at: Option<usize>,
}

/// In-memory `RemoteStore` implementation.
#[derive(Default)]
pub struct MemoryRemoteStore {
    inner: Mutex<Inner>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`-th insert call (1-based, counting from now) fail once.
    pub fn fail_insert_at(&self, n: usize) {
        let mut inner = self.inner.lock().unwrap();
        let calls = inner.insert_calls;
        inner.fail_insert_at = Some(calls + n);
    }

    /// Record ids in the order inserts were applied.
    pub fn insert_order(&self) -> Vec<Uuid> {
        self.inner.lock().unwrap().insert_log.clone()
    }

    /// Number of insert calls seen (including failed ones).
    pub fn insert_calls(&self) -> usize {
        self.inner.lock().unwrap().insert_calls
    }

    /// Audit events accumulated so far.
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.inner.lock().unwrap().audit.clone()
    }

    fn check_insert_gate(inner: &mut Inner) -> Result<()> {
        inner.insert_calls += 1;
        if inner.fail_insert_at == Some(inner.insert_calls) {
            inner.fail_insert_at = None;
            return Err(Error::Remote("injected insert failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn insert_resolution(&self, record: &CrisisResolution) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_insert_gate(&mut inner)?;
        if !inner.resolutions.contains_key(&record.id) {
            inner.insert_log.push(record.id);
        }
        // Idempotent by client id: a replayed insert overwrites identically
        inner.resolutions.insert(record.id, record.clone());
        Ok(())
    }

    async fn insert_check_in(&self, record: &CheckInResponse) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_insert_gate(&mut inner)?;
        if !inner.check_ins.contains_key(&record.id) {
            inner.insert_log.push(record.id);
        }
        inner.check_ins.insert(record.id, record.clone());
        Ok(())
    }

    async fn insert_follow_up(&self, record: &FollowUpTask) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_insert_gate(&mut inner)?;
        if !inner.follow_ups.contains_key(&record.id) {
            inner.insert_log.push(record.id);
        }
        inner.follow_ups.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_follow_up(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: &FollowUpTaskUpdate,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        match inner.follow_ups.get_mut(&id) {
            Some(task) if task.user_id == user_id => {
                task.apply(update);
                Ok(())
            }
            _ => Err(Error::NotFound(format!("follow-up task {id}"))),
        }
    }

    async fn list_resolutions(&self, user_id: Uuid) -> Result<Vec<CrisisResolution>> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<_> = inner
            .resolutions
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.resolved_at.cmp(&a.resolved_at));
        Ok(records)
    }

    async fn list_check_ins(&self, user_id: Uuid) -> Result<Vec<CheckInResponse>> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<_> = inner
            .check_ins
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn list_follow_ups(&self, user_id: Uuid) -> Result<Vec<FollowUpTask>> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<_> = inner
            .follow_ups
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for));
        Ok(records)
    }

    async fn upsert_plan(&self, plan: &EncryptedCrisisPlan) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.plans.insert(plan.user_id, plan.clone());
        Ok(())
    }

    async fn fetch_plan(&self, user_id: Uuid) -> Result<Option<EncryptedCrisisPlan>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.plans.get(&user_id).cloned())
    }

    async fn insert_audit_event(&self, event: &AuditEvent) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.audit.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity_core::{NewCrisisResolution, NewFollowUpTask};

    #[tokio::test]
    async fn test_insert_is_idempotent_by_id() {
        let store = MemoryRemoteStore::new();
        let rec = CrisisResolution::new(Uuid::new_v4(), NewCrisisResolution::default());

        store.insert_resolution(&rec).await.unwrap();
        store.insert_resolution(&rec).await.unwrap();

        assert_eq!(store.list_resolutions(rec.user_id).await.unwrap().len(), 1);
        assert_eq!(store.insert_order(), vec![rec.id]);
    }

    #[tokio::test]
    async fn test_lists_are_user_scoped() {
        let store = MemoryRemoteStore::new();
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();

        store
            .insert_resolution(&CrisisResolution::new(u1, NewCrisisResolution::default()))
            .await
            .unwrap();

        assert_eq!(store.list_resolutions(u1).await.unwrap().len(), 1);
        assert!(store.list_resolutions(u2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_insert_at_fails_once() {
        let store = MemoryRemoteStore::new();
        store.fail_insert_at(2);

        let user = Uuid::new_v4();
        let a = CrisisResolution::new(user, NewCrisisResolution::default());
        let b = CrisisResolution::new(user, NewCrisisResolution::default());

        assert!(store.insert_resolution(&a).await.is_ok());
        assert!(store.insert_resolution(&b).await.is_err());
        // The injected failure is one-shot; a retry lands
        assert!(store.insert_resolution(&b).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_follow_up_requires_matching_user() {
        let store = MemoryRemoteStore::new();
        let task = FollowUpTask::new(
            Uuid::new_v4(),
            NewFollowUpTask {
                task_type: "safety_check".into(),
                scheduled_for: chrono::Utc::now(),
                completed: false,
            },
        );
        store.insert_follow_up(&task).await.unwrap();

        let wrong_user = Uuid::new_v4();
        let update = FollowUpTaskUpdate {
            completed: Some(true),
            ..Default::default()
        };
        assert!(store
            .update_follow_up(wrong_user, task.id, &update)
            .await
            .is_err());
        assert!(store
            .update_follow_up(task.user_id, task.id, &update)
            .await
            .is_ok());
    }
}
