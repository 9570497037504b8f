//! JSON key-value fallback store.
//!
//! Used when the primary SQLite store cannot be opened (corrupt file,
//! unwritable directory, missing SQLite support on the platform). Each
//! collection is one JSON file holding the whole collection; functionally
//! equivalent to the primary store but without per-record indexing, so
//! every write rewrites its collection file.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use serenity_core::defaults::SYNC_QUEUE_CAP;
use serenity_core::{
    CheckInResponse, CrisisResolution, Error, FollowUpTask, RecoverySnapshot, Result,
    SyncQueueItem,
};

const RESOLUTIONS_FILE: &str = "resolutions.json";
const CHECK_INS_FILE: &str = "check_ins.json";
const FOLLOW_UPS_FILE: &str = "follow_ups.json";
const QUEUE_FILE: &str = "sync_queue.json";

/// Whole-collection JSON blob store.
pub struct JsonFallbackStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles across collections. The store is
    /// per-session and single-user; one lock is enough.
    lock: Mutex<()>,
}

impl JsonFallbackStore {
    /// Open (and create) the fallback directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    async fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.path(file);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(Into::into),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Write the whole collection atomically: temp file, then rename.
    async fn write_collection<T: Serialize>(&self, file: &str, records: &[T]) -> Result<()> {
        let path = self.path(file);
        let tmp = self.path(&format!("{file}.tmp"));

        let bytes = serde_json::to_vec(records)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn upsert<T, F>(&self, file: &str, record: T, same_id: F) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: Fn(&T) -> bool,
    {
        let _guard = self.lock.lock().await;
        let mut records: Vec<T> = self.read_collection(file).await?;
        match records.iter_mut().find(|r| same_id(r)) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write_collection(file, &records).await
    }

    pub async fn save_resolution(&self, record: &CrisisResolution) -> Result<()> {
        let id = record.id;
        self.upsert(RESOLUTIONS_FILE, record.clone(), |r: &CrisisResolution| {
            r.id == id
        })
        .await
    }

    pub async fn list_resolutions(&self) -> Result<Vec<CrisisResolution>> {
        let mut records: Vec<CrisisResolution> = self.read_collection(RESOLUTIONS_FILE).await?;
        records.sort_by(|a, b| b.resolved_at.cmp(&a.resolved_at));
        Ok(records)
    }

    pub async fn save_check_in(&self, record: &CheckInResponse) -> Result<()> {
        let id = record.id;
        self.upsert(CHECK_INS_FILE, record.clone(), |r: &CheckInResponse| {
            r.id == id
        })
        .await
    }

    pub async fn list_check_ins(&self) -> Result<Vec<CheckInResponse>> {
        let mut records: Vec<CheckInResponse> = self.read_collection(CHECK_INS_FILE).await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub async fn save_follow_up(&self, record: &FollowUpTask) -> Result<()> {
        let id = record.id;
        self.upsert(FOLLOW_UPS_FILE, record.clone(), |r: &FollowUpTask| {
            r.id == id
        })
        .await
    }

    pub async fn list_follow_ups(&self) -> Result<Vec<FollowUpTask>> {
        let mut records: Vec<FollowUpTask> = self.read_collection(FOLLOW_UPS_FILE).await?;
        records.sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for));
        Ok(records)
    }

    pub async fn replace_all(&self, snapshot: &RecoverySnapshot) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write_collection(RESOLUTIONS_FILE, &snapshot.resolutions)
            .await?;
        self.write_collection(CHECK_INS_FILE, &snapshot.check_in_responses)
            .await?;
        self.write_collection(FOLLOW_UPS_FILE, &snapshot.follow_up_tasks)
            .await
    }

    pub async fn clear_all(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        for file in [RESOLUTIONS_FILE, CHECK_INS_FILE, FOLLOW_UPS_FILE, QUEUE_FILE] {
            self.write_collection::<serde_json::Value>(file, &[]).await?;
        }
        Ok(())
    }

    pub async fn push_op(&self, item: &SyncQueueItem) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items: Vec<SyncQueueItem> = self.read_collection(QUEUE_FILE).await?;
        if items.len() >= SYNC_QUEUE_CAP {
            return Err(Error::Store(format!(
                "sync queue is full ({} pending operations)",
                items.len()
            )));
        }
        items.push(item.clone());
        self.write_collection(QUEUE_FILE, &items).await
    }

    pub async fn pending_ops(&self) -> Result<Vec<SyncQueueItem>> {
        self.read_collection(QUEUE_FILE).await
    }

    pub async fn clear_ops(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write_collection::<SyncQueueItem>(QUEUE_FILE, &[]).await
    }

    pub async fn queue_len(&self) -> Result<usize> {
        Ok(self.pending_ops().await?.len())
    }
}

impl std::fmt::Debug for JsonFallbackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFallbackStore")
            .field("dir", &self.dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity_core::{NewCheckInResponse, NewCrisisResolution, SyncOperation};
    use uuid::Uuid;

    async fn store() -> (tempfile::TempDir, JsonFallbackStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFallbackStore::open(dir.path().join("fallback"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let (_dir, store) = store().await;
        assert!(store.list_resolutions().await.unwrap().is_empty());
        assert!(store.pending_ops().await.unwrap().is_empty());
        assert_eq!(store.queue_len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_and_list_resolution() {
        let (_dir, store) = store().await;
        let rec = CrisisResolution::new(
            Uuid::new_v4(),
            NewCrisisResolution {
                interventions_used: vec!["grounding".into()],
                effectiveness_rating: Some(3),
                notes: None,
            },
        );

        store.save_resolution(&rec).await.unwrap();

        assert_eq!(store.list_resolutions().await.unwrap(), vec![rec]);
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let (_dir, store) = store().await;
        let mut rec = CrisisResolution::new(Uuid::new_v4(), NewCrisisResolution::default());

        store.save_resolution(&rec).await.unwrap();
        rec.notes = Some("updated".into());
        store.save_resolution(&rec).await.unwrap();

        let listed = store.list_resolutions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].notes.as_deref(), Some("updated"));
    }

    #[tokio::test]
    async fn test_queue_fifo_and_clear() {
        let (_dir, store) = store().await;
        let a = SyncQueueItem::new(SyncOperation::CheckInResponse(CheckInResponse::new(
            Uuid::new_v4(),
            NewCheckInResponse {
                mood_rating: 1,
                ..Default::default()
            },
        )));
        let b = SyncQueueItem::new(SyncOperation::CheckInResponse(CheckInResponse::new(
            Uuid::new_v4(),
            NewCheckInResponse {
                mood_rating: 2,
                ..Default::default()
            },
        )));

        store.push_op(&a).await.unwrap();
        store.push_op(&b).await.unwrap();
        assert_eq!(store.pending_ops().await.unwrap(), vec![a, b]);

        store.clear_ops().await.unwrap();
        assert_eq!(store.queue_len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fallback");

        let rec = CrisisResolution::new(Uuid::new_v4(), NewCrisisResolution::default());
        {
            let store = JsonFallbackStore::open(&path).await.unwrap();
            store.save_resolution(&rec).await.unwrap();
        }

        let store = JsonFallbackStore::open(&path).await.unwrap();
        assert_eq!(store.list_resolutions().await.unwrap(), vec![rec]);
    }
}
