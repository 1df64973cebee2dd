use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::QueueError;
use crate::models::{ConsultationEvent, QueueEntry, QueueSnapshot};
use crate::services::{events, mutation, QueueMutation};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

struct QueueState {
    entries: Vec<QueueEntry>,
    version: u64,
    committed_at: DateTime<Utc>,
}

/// Authoritative holder of one clinic's master list.
///
/// Commits are serialized through the state mutex: concurrent mutation
/// intents for the same clinic are applied one at a time, each against
/// the snapshot the previous commit produced. A rejected mutation
/// leaves state and version untouched.
pub struct ClinicQueueStore {
    clinic_id: Uuid,
    state: Mutex<QueueState>,
    snapshots: broadcast::Sender<QueueSnapshot>,
}

impl ClinicQueueStore {
    pub fn new(clinic_id: Uuid) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);

        Self {
            clinic_id,
            state: Mutex::new(QueueState {
                entries: Vec::new(),
                version: 0,
                committed_at: Utc::now(),
            }),
            snapshots,
        }
    }

    pub fn clinic_id(&self) -> Uuid {
        self.clinic_id
    }

    /// Current committed state. A store that has never committed reports
    /// an empty list at version 0.
    pub async fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.lock().await;
        self.snapshot_of(&state)
    }

    /// Receives the full snapshot of every subsequent commit.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueSnapshot> {
        self.snapshots.subscribe()
    }

    /// Applies a mutation against the latest committed list, recomputes
    /// derived positions, diffs consultation state, commits and
    /// broadcasts. Returns the new snapshot plus the events the commit
    /// emitted; the caller owns delivering those to the sink.
    pub async fn commit(
        &self,
        mutation: &QueueMutation,
    ) -> Result<(QueueSnapshot, Vec<ConsultationEvent>), QueueError> {
        let mut state = self.state.lock().await;

        let before = events::current_consultations(&state.entries);
        let next = mutation::apply(state.entries.clone(), mutation)?;
        let after = events::current_consultations(&next);

        let now = Utc::now();
        let emitted = events::diff_consultations(&before, &after, now);

        state.entries = next;
        state.version += 1;
        state.committed_at = now;

        let snapshot = self.snapshot_of(&state);

        // No receivers is fine; subscribers come and go
        let _ = self.snapshots.send(snapshot.clone());

        debug!(
            "Committed queue version {} for clinic {} ({} entries, {} events)",
            snapshot.version,
            self.clinic_id,
            snapshot.entries.len(),
            emitted.len()
        );

        Ok((snapshot, emitted))
    }

    fn snapshot_of(&self, state: &QueueState) -> QueueSnapshot {
        QueueSnapshot {
            clinic_id: self.clinic_id,
            version: state.version,
            entries: state.entries.clone(),
            committed_at: state.committed_at,
        }
    }
}

/// Lazily-created store per clinic. Clinics are fully independent;
/// nothing serializes commits across two different stores.
pub struct QueueStoreRegistry {
    stores: RwLock<HashMap<Uuid, Arc<ClinicQueueStore>>>,
}

impl QueueStoreRegistry {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
        }
    }

    pub async fn store_for(&self, clinic_id: Uuid) -> Arc<ClinicQueueStore> {
        {
            let stores = self.stores.read().await;
            if let Some(store) = stores.get(&clinic_id) {
                return Arc::clone(store);
            }
        }

        let mut stores = self.stores.write().await;
        Arc::clone(
            stores
                .entry(clinic_id)
                .or_insert_with(|| Arc::new(ClinicQueueStore::new(clinic_id))),
        )
    }

    pub async fn active_clinics(&self) -> Vec<Uuid> {
        let stores = self.stores.read().await;
        stores.keys().copied().collect()
    }
}

impl Default for QueueStoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}
