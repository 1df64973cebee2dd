use std::collections::HashMap;

use uuid::Uuid;

use crate::models::QueueEntry;

/// Reassigns every derived position field from master-list order.
///
/// `global_position` becomes the dense 1-based list index; `wait_number`
/// becomes the 0-based rank among entries sharing a doctor, in list
/// order. Idempotent, and the only place position fields are written:
/// mutation operations must end here instead of patching numbers inline.
pub fn recompute(mut entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
    let mut per_doctor: HashMap<Uuid, u32> = HashMap::new();

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.global_position = index as u32 + 1;

        let rank = per_doctor.entry(entry.doctor_id).or_insert(0);
        entry.wait_number = *rank;
        *rank += 1;
    }

    entries
}

/// The entry being served for `doctor_id`: the first of the doctor's
/// entries in master order, if any.
pub fn current_for(entries: &[QueueEntry], doctor_id: Uuid) -> Option<&QueueEntry> {
    entries.iter().find(|e| e.doctor_id == doctor_id)
}
