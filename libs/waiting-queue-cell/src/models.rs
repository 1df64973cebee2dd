use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One waiting patient in a clinic's master queue.
///
/// `global_position` and `wait_number` are derived from master-list order
/// on every commit and are never written by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub department: String,
    pub patient_name: String,
    pub appointment_id: Option<Uuid>,
    /// 1-based index in the master list. Dense, no gaps.
    pub global_position: u32,
    /// 0-based rank among entries for the same doctor, in master order.
    pub wait_number: u32,
    pub admitted_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(
        clinic_id: Uuid,
        doctor_id: Uuid,
        doctor_name: String,
        department: String,
        patient_name: String,
        appointment_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            doctor_id,
            doctor_name,
            department,
            patient_name,
            appointment_id,
            global_position: 0,
            wait_number: 0,
            admitted_at: Utc::now(),
        }
    }

    /// Whether this entry is the one being served for its doctor.
    pub fn is_current(&self) -> bool {
        self.wait_number == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmitPatientRequest {
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub appointment_id: Option<Uuid>,
    /// Display overrides; when absent the doctor directory fills them in.
    pub doctor_name: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<Uuid>,
}

/// Full committed state of one clinic's queue. `version` increments by
/// one on every commit, giving subscribers a total order on snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub clinic_id: Uuid,
    pub version: u64,
    pub entries: Vec<QueueEntry>,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsultationPhase {
    Started,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationEvent {
    pub doctor_id: Uuid,
    pub appointment_id: Uuid,
    pub phase: ConsultationPhase,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    pub ended_appointment_id: Option<Uuid>,
    pub started_appointment_id: Option<Uuid>,
}

impl AdvanceOutcome {
    /// Reads the served/next appointment ids for `doctor_id` out of the
    /// events a commit emitted.
    pub fn from_events(doctor_id: Uuid, events: &[ConsultationEvent]) -> Self {
        let ended_appointment_id = events
            .iter()
            .find(|e| e.doctor_id == doctor_id && e.phase == ConsultationPhase::Ended)
            .map(|e| e.appointment_id);
        let started_appointment_id = events
            .iter()
            .find(|e| e.doctor_id == doctor_id && e.phase == ConsultationPhase::Started)
            .map(|e| e.appointment_id);

        Self {
            ended_appointment_id,
            started_appointment_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorQueueStats {
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub department: String,
    pub waiting: u32,
    pub current_appointment_id: Option<Uuid>,
    pub current_patient_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    pub clinic_id: Uuid,
    pub total_waiting: u32,
    pub doctors: Vec<DoctorQueueStats>,
}
