use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{ConsultationEvent, ConsultationPhase, QueueEntry};

/// The consultation state per doctor: the appointment id of the entry
/// being served, or None when the doctor has no entries or the front
/// entry is a walk-in without an appointment record.
pub type CurrentConsultations = HashMap<Uuid, Option<Uuid>>;

pub fn current_consultations(entries: &[QueueEntry]) -> CurrentConsultations {
    let mut current = CurrentConsultations::new();
    for entry in entries {
        // First entry per doctor in master order is the one being served
        current.entry(entry.doctor_id).or_insert(entry.appointment_id);
    }
    current
}

/// Diffs the per-doctor consultation state across a mutation and emits
/// the start/end events the change implies. Doctors are visited in
/// sorted order and Ended precedes Started per doctor, so the emitted
/// sequence is deterministic.
pub fn diff_consultations(
    before: &CurrentConsultations,
    after: &CurrentConsultations,
    at: DateTime<Utc>,
) -> Vec<ConsultationEvent> {
    let doctors: BTreeSet<Uuid> = before.keys().chain(after.keys()).copied().collect();

    let mut events = Vec::new();
    for doctor_id in doctors {
        let old = before.get(&doctor_id).copied().flatten();
        let new = after.get(&doctor_id).copied().flatten();

        if old == new {
            continue;
        }

        if let Some(appointment_id) = old {
            events.push(ConsultationEvent {
                doctor_id,
                appointment_id,
                phase: ConsultationPhase::Ended,
                at,
            });
        }
        if let Some(appointment_id) = new {
            events.push(ConsultationEvent {
                doctor_id,
                appointment_id,
                phase: ConsultationPhase::Started,
                at,
            });
        }
    }

    events
}
