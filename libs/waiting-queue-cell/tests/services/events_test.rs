use chrono::Utc;
use uuid::Uuid;

use waiting_queue_cell::services::events::{current_consultations, diff_consultations};
use waiting_queue_cell::services::ordering::recompute;
use waiting_queue_cell::ConsultationPhase;

use super::{entry_for, entry_with_appointment};

#[test]
fn test_first_admission_emits_only_started() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();
    let appointment = Uuid::new_v4();

    let before = current_consultations(&[]);
    let after_entries = recompute(vec![entry_with_appointment(clinic, doctor, "Ada", appointment)]);
    let after = current_consultations(&after_entries);

    let events = diff_consultations(&before, &after, Utc::now());

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].phase, ConsultationPhase::Started);
    assert_eq!(events[0].appointment_id, appointment);
    assert_eq!(events[0].doctor_id, doctor);
}

#[test]
fn test_advance_emits_ended_then_started() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();
    let appointment_a = Uuid::new_v4();
    let appointment_b = Uuid::new_v4();

    let entries = recompute(vec![
        entry_with_appointment(clinic, doctor, "A", appointment_a),
        entry_with_appointment(clinic, doctor, "B", appointment_b),
    ]);
    let before = current_consultations(&entries);

    let advanced: Vec<_> = entries.into_iter().skip(1).collect();
    let after = current_consultations(&recompute(advanced));

    let events = diff_consultations(&before, &after, Utc::now());

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].phase, ConsultationPhase::Ended);
    assert_eq!(events[0].appointment_id, appointment_a);
    assert_eq!(events[1].phase, ConsultationPhase::Started);
    assert_eq!(events[1].appointment_id, appointment_b);
}

#[test]
fn test_deleting_last_entry_emits_only_ended() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();
    let appointment = Uuid::new_v4();

    let entries = recompute(vec![entry_with_appointment(clinic, doctor, "A", appointment)]);
    let before = current_consultations(&entries);
    let after = current_consultations(&[]);

    let events = diff_consultations(&before, &after, Utc::now());

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].phase, ConsultationPhase::Ended);
    assert_eq!(events[0].appointment_id, appointment);
}

#[test]
fn test_walk_in_without_appointment_emits_nothing() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    let before = current_consultations(&[]);
    let after_entries = recompute(vec![entry_for(clinic, doctor, "walk-in")]);
    let after = current_consultations(&after_entries);

    let events = diff_consultations(&before, &after, Utc::now());
    assert!(events.is_empty(), "no appointment record, no event");
}

#[test]
fn test_unchanged_doctors_emit_nothing() {
    let clinic = Uuid::new_v4();
    let doctor_a = Uuid::new_v4();
    let doctor_b = Uuid::new_v4();
    let appointment_a = Uuid::new_v4();
    let appointment_b1 = Uuid::new_v4();
    let appointment_b2 = Uuid::new_v4();

    let entries = recompute(vec![
        entry_with_appointment(clinic, doctor_a, "a1", appointment_a),
        entry_with_appointment(clinic, doctor_b, "b1", appointment_b1),
        entry_with_appointment(clinic, doctor_b, "b2", appointment_b2),
    ]);
    let before = current_consultations(&entries);

    // Serve doctor B's current; doctor A's state is untouched
    let remaining: Vec<_> = entries
        .into_iter()
        .filter(|e| e.appointment_id != Some(appointment_b1))
        .collect();
    let after = current_consultations(&recompute(remaining));

    let events = diff_consultations(&before, &after, Utc::now());

    assert_eq!(events.len(), 2);
    assert!(
        events.iter().all(|e| e.doctor_id == doctor_b),
        "only doctor B may appear in the diff"
    );
}

#[test]
fn test_reorder_swapping_current_emits_both_transitions() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();
    let appointment_a = Uuid::new_v4();
    let appointment_b = Uuid::new_v4();

    let entries = recompute(vec![
        entry_with_appointment(clinic, doctor, "A", appointment_a),
        entry_with_appointment(clinic, doctor, "B", appointment_b),
    ]);
    let before = current_consultations(&entries);

    let swapped: Vec<_> = entries.into_iter().rev().collect();
    let after = current_consultations(&recompute(swapped));

    let events = diff_consultations(&before, &after, Utc::now());

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].phase, ConsultationPhase::Ended);
    assert_eq!(events[0].appointment_id, appointment_a);
    assert_eq!(events[1].phase, ConsultationPhase::Started);
    assert_eq!(events[1].appointment_id, appointment_b);
}
