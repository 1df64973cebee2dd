use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use doctor_cell::DoctorDirectory;

use crate::error::QueueError;
use crate::models::{
    AdmitPatientRequest, AdvanceOutcome, ConsultationEvent, DoctorQueueStats, QueueEntry,
    QueueSnapshot, QueueStats,
};
use crate::services::{ConsultationSink, QueueMutation, QueueStoreRegistry};

/// Front door of the queue engine: validates and enriches admissions,
/// routes mutations to the owning clinic's store, and fans emitted
/// consultation events out to the sink.
pub struct WaitingQueueService {
    registry: QueueStoreRegistry,
    directory: Arc<dyn DoctorDirectory>,
    sink: Arc<dyn ConsultationSink>,
}

impl WaitingQueueService {
    pub fn new(directory: Arc<dyn DoctorDirectory>, sink: Arc<dyn ConsultationSink>) -> Self {
        Self {
            registry: QueueStoreRegistry::new(),
            directory,
            sink,
        }
    }

    /// Admit a patient at the tail of the clinic's queue.
    ///
    /// The doctor must exist in the directory regardless of whether the
    /// caller supplied display fields; unknown doctors are rejected.
    pub async fn admit(
        &self,
        clinic_id: Uuid,
        request: AdmitPatientRequest,
    ) -> Result<QueueEntry, QueueError> {
        if request.patient_name.trim().is_empty() {
            return Err(QueueError::Validation(
                "patient name must not be empty".to_string(),
            ));
        }

        let profile = self
            .directory
            .lookup(clinic_id, request.doctor_id)
            .await
            .map_err(|e| QueueError::Directory(e.to_string()))?
            .ok_or(QueueError::UnknownDoctor(request.doctor_id))?;

        let doctor_name = request.doctor_name.unwrap_or(profile.full_name);
        let department = request.department.unwrap_or(profile.department);

        let entry = QueueEntry::new(
            clinic_id,
            request.doctor_id,
            doctor_name,
            department,
            request.patient_name,
            request.appointment_id,
        );
        let entry_id = entry.id;

        let store = self.registry.store_for(clinic_id).await;
        let (snapshot, events) = store.commit(&QueueMutation::Admit { entry }).await?;
        self.dispatch_events(events);

        info!(
            "Admitted patient to queue for clinic {} (version {})",
            clinic_id, snapshot.version
        );

        let committed = snapshot
            .entries
            .into_iter()
            .find(|e| e.id == entry_id)
            .expect("committed snapshot contains the admitted entry");
        Ok(committed)
    }

    /// Serve the doctor's current patient and move the next one up.
    pub async fn advance(
        &self,
        clinic_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<AdvanceOutcome, QueueError> {
        let store = self.registry.store_for(clinic_id).await;
        let (_, events) = store.commit(&QueueMutation::Advance { doctor_id }).await?;

        let outcome = AdvanceOutcome::from_events(doctor_id, &events);
        self.dispatch_events(events);
        Ok(outcome)
    }

    pub async fn remove(&self, clinic_id: Uuid, entry_id: Uuid) -> Result<(), QueueError> {
        let store = self.registry.store_for(clinic_id).await;
        let (_, events) = store.commit(&QueueMutation::Delete { entry_id }).await?;
        self.dispatch_events(events);
        Ok(())
    }

    /// Replace the master order with a caller-supplied permutation of
    /// the current entry identities.
    pub async fn reorder(&self, clinic_id: Uuid, order: Vec<Uuid>) -> Result<(), QueueError> {
        let store = self.registry.store_for(clinic_id).await;
        let (_, events) = store.commit(&QueueMutation::Reorder { order }).await?;
        self.dispatch_events(events);
        Ok(())
    }

    pub async fn snapshot(&self, clinic_id: Uuid) -> QueueSnapshot {
        let store = self.registry.store_for(clinic_id).await;
        store.snapshot().await
    }

    pub async fn subscribe(&self, clinic_id: Uuid) -> broadcast::Receiver<QueueSnapshot> {
        let store = self.registry.store_for(clinic_id).await;
        store.subscribe()
    }

    /// Per-doctor waiting counts for the front-desk header widgets.
    pub async fn stats(&self, clinic_id: Uuid) -> QueueStats {
        let snapshot = self.snapshot(clinic_id).await;

        let mut doctors: Vec<DoctorQueueStats> = Vec::new();
        for entry in &snapshot.entries {
            match doctors.iter_mut().find(|d| d.doctor_id == entry.doctor_id) {
                Some(stats) => stats.waiting += 1,
                None => doctors.push(DoctorQueueStats {
                    doctor_id: entry.doctor_id,
                    doctor_name: entry.doctor_name.clone(),
                    department: entry.department.clone(),
                    waiting: 1,
                    current_appointment_id: entry.appointment_id,
                    current_patient_name: Some(entry.patient_name.clone()),
                }),
            }
        }

        QueueStats {
            clinic_id,
            total_waiting: snapshot.entries.len() as u32,
            doctors,
        }
    }

    /// Fire-and-forget delivery towards the external record store. The
    /// commit that produced these events already succeeded; a failed
    /// write is logged and dropped.
    fn dispatch_events(&self, events: Vec<ConsultationEvent>) {
        if events.is_empty() {
            return;
        }

        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            for event in events {
                if let Err(e) = sink.record(&event).await {
                    warn!(
                        "Failed to record consultation event for appointment {}: {}",
                        event.appointment_id, e
                    );
                }
            }
        });
    }
}
