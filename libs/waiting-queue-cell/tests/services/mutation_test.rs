use assert_matches::assert_matches;
use uuid::Uuid;

use waiting_queue_cell::services::mutation::{apply, QueueMutation};
use waiting_queue_cell::services::ordering::recompute;
use waiting_queue_cell::QueueError;

use super::{assert_queue_invariants, entry_for};

#[test]
fn test_admit_appends_at_tail() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    let entries = recompute(vec![entry_for(clinic, doctor, "Ada")]);
    let new_entry = entry_for(clinic, doctor, "Grace");

    let updated = apply(entries, &QueueMutation::Admit { entry: new_entry }).unwrap();

    assert_eq!(updated.len(), 2);
    assert_eq!(updated[1].patient_name, "Grace");
    assert_eq!(updated[1].wait_number, 1);
    assert_queue_invariants(&updated);
}

#[test]
fn test_admit_to_empty_doctor_queue_is_current() {
    let clinic = Uuid::new_v4();
    let doctor_a = Uuid::new_v4();
    let doctor_b = Uuid::new_v4();

    // Doctor B's queue already has patients; doctor A's is empty
    let entries = recompute(vec![
        entry_for(clinic, doctor_b, "p1"),
        entry_for(clinic, doctor_b, "p2"),
    ]);

    let updated = apply(
        entries,
        &QueueMutation::Admit {
            entry: entry_for(clinic, doctor_a, "first"),
        },
    )
    .unwrap();

    let admitted = updated.iter().find(|e| e.doctor_id == doctor_a).unwrap();
    assert_eq!(admitted.wait_number, 0);
    assert!(admitted.is_current());
}

#[test]
fn test_admit_rejects_blank_patient_name() {
    let clinic = Uuid::new_v4();
    let entry = entry_for(clinic, Uuid::new_v4(), "   ");

    let result = apply(Vec::new(), &QueueMutation::Admit { entry });
    assert_matches!(result, Err(QueueError::Validation(_)));
}

#[test]
fn test_admit_rejects_nil_doctor_id() {
    let clinic = Uuid::new_v4();
    let entry = entry_for(clinic, Uuid::nil(), "Ada");

    let result = apply(Vec::new(), &QueueMutation::Admit { entry });
    assert_matches!(result, Err(QueueError::Validation(_)));
}

#[test]
fn test_delete_reindexes_following_entries() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    let entries = recompute(vec![
        entry_for(clinic, doctor, "A"),
        entry_for(clinic, doctor, "B"),
        entry_for(clinic, doctor, "C"),
    ]);
    let b_id = entries[1].id;

    let updated = apply(entries, &QueueMutation::Delete { entry_id: b_id }).unwrap();

    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0].patient_name, "A");
    assert_eq!(updated[0].wait_number, 0);
    assert_eq!(updated[1].patient_name, "C");
    assert_eq!(updated[1].wait_number, 1);
    assert_queue_invariants(&updated);
}

#[test]
fn test_delete_unknown_identity_is_not_found() {
    let clinic = Uuid::new_v4();
    let entries = recompute(vec![entry_for(clinic, Uuid::new_v4(), "A")]);

    let result = apply(
        entries,
        &QueueMutation::Delete {
            entry_id: Uuid::new_v4(),
        },
    );
    assert_matches!(result, Err(QueueError::NotFound(_)));
}

#[test]
fn test_delete_does_not_disturb_other_doctors() {
    let clinic = Uuid::new_v4();
    let doctor_a = Uuid::new_v4();
    let doctor_b = Uuid::new_v4();

    let entries = recompute(vec![
        entry_for(clinic, doctor_a, "a1"),
        entry_for(clinic, doctor_b, "b1"),
        entry_for(clinic, doctor_a, "a2"),
        entry_for(clinic, doctor_b, "b2"),
    ]);
    let a1_id = entries[0].id;

    let updated = apply(entries, &QueueMutation::Delete { entry_id: a1_id }).unwrap();

    let waits_b: Vec<u32> = updated
        .iter()
        .filter(|e| e.doctor_id == doctor_b)
        .map(|e| e.wait_number)
        .collect();
    assert_eq!(waits_b, vec![0, 1], "doctor B's sequence must be untouched");
    assert_queue_invariants(&updated);
}

#[test]
fn test_advance_serves_front_and_promotes_next() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    let entries = recompute(vec![
        entry_for(clinic, doctor, "A"),
        entry_for(clinic, doctor, "B"),
        entry_for(clinic, doctor, "C"),
    ]);

    let updated = apply(entries, &QueueMutation::Advance { doctor_id: doctor }).unwrap();

    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0].patient_name, "B");
    assert_eq!(updated[0].wait_number, 0);
    assert_eq!(updated[1].patient_name, "C");
    assert_eq!(updated[1].wait_number, 1);
}

#[test]
fn test_advance_empty_doctor_queue_fails() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();
    let entries = recompute(vec![entry_for(clinic, Uuid::new_v4(), "someone else")]);

    let result = apply(entries, &QueueMutation::Advance { doctor_id: doctor });
    assert_matches!(result, Err(QueueError::EmptyQueue(id)) if id == doctor);
}

#[test]
fn test_reorder_applies_full_permutation() {
    let clinic = Uuid::new_v4();
    let doctor_a = Uuid::new_v4();
    let doctor_b = Uuid::new_v4();

    let entries = recompute(vec![
        entry_for(clinic, doctor_a, "a1"),
        entry_for(clinic, doctor_a, "a2"),
        entry_for(clinic, doctor_b, "b1"),
    ]);

    // Move b1 to the front, swap a1/a2
    let order = vec![entries[2].id, entries[1].id, entries[0].id];
    let updated = apply(entries, &QueueMutation::Reorder { order }).unwrap();

    assert_eq!(updated[0].patient_name, "b1");
    assert_eq!(updated[0].global_position, 1);
    assert_eq!(updated[1].patient_name, "a2");
    assert_eq!(updated[1].wait_number, 0, "a2 is now doctor A's current");
    assert_eq!(updated[2].patient_name, "a1");
    assert_eq!(updated[2].wait_number, 1);
    assert_queue_invariants(&updated);
}

#[test]
fn test_reorder_rejects_dropped_entry() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    let entries = recompute(vec![
        entry_for(clinic, doctor, "A"),
        entry_for(clinic, doctor, "B"),
    ]);
    let order = vec![entries[0].id];

    let result = apply(entries, &QueueMutation::Reorder { order });
    assert_matches!(result, Err(QueueError::Permutation(_)));
}

#[test]
fn test_reorder_rejects_foreign_entry() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    let entries = recompute(vec![entry_for(clinic, doctor, "A")]);
    let order = vec![Uuid::new_v4()];

    let result = apply(entries, &QueueMutation::Reorder { order });
    assert_matches!(result, Err(QueueError::Permutation(_)));
}

#[test]
fn test_reorder_rejects_duplicated_entry() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    let entries = recompute(vec![
        entry_for(clinic, doctor, "A"),
        entry_for(clinic, doctor, "B"),
    ]);
    let order = vec![entries[0].id, entries[0].id];

    let result = apply(entries, &QueueMutation::Reorder { order });
    assert_matches!(result, Err(QueueError::Permutation(_)));
}

#[test]
fn test_rejected_mutation_returns_error_not_partial_list() {
    let clinic = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    let entries = recompute(vec![
        entry_for(clinic, doctor, "A"),
        entry_for(clinic, doctor, "B"),
    ]);
    let before = entries.clone();

    // The caller keeps its list when apply rejects
    let result = apply(
        entries,
        &QueueMutation::Delete {
            entry_id: Uuid::new_v4(),
        },
    );
    assert!(result.is_err());
    assert_queue_invariants(&before);
}
