use std::collections::HashMap;

use uuid::Uuid;

use crate::error::QueueError;
use crate::models::QueueEntry;
use crate::services::ordering;

/// A mutation intent against one clinic's master list. Applying one is
/// pure; all I/O happens around the store's commit.
#[derive(Debug, Clone)]
pub enum QueueMutation {
    Admit { entry: QueueEntry },
    Delete { entry_id: Uuid },
    Advance { doctor_id: Uuid },
    Reorder { order: Vec<Uuid> },
}

/// Applies a mutation to the current master list and returns the new
/// list with all derived positions recomputed. A rejected mutation
/// returns an error and the caller keeps the old list untouched.
pub fn apply(
    entries: Vec<QueueEntry>,
    mutation: &QueueMutation,
) -> Result<Vec<QueueEntry>, QueueError> {
    match mutation {
        QueueMutation::Admit { entry } => admit(entries, entry.clone()),
        QueueMutation::Delete { entry_id } => delete(entries, *entry_id),
        QueueMutation::Advance { doctor_id } => advance(entries, *doctor_id),
        QueueMutation::Reorder { order } => reorder(entries, order),
    }
}

fn admit(mut entries: Vec<QueueEntry>, entry: QueueEntry) -> Result<Vec<QueueEntry>, QueueError> {
    if entry.doctor_id.is_nil() {
        return Err(QueueError::Validation("doctor id must be set".to_string()));
    }
    if entry.patient_name.trim().is_empty() {
        return Err(QueueError::Validation("patient name must not be empty".to_string()));
    }

    entries.push(entry);
    Ok(ordering::recompute(entries))
}

fn delete(mut entries: Vec<QueueEntry>, entry_id: Uuid) -> Result<Vec<QueueEntry>, QueueError> {
    // Lookup by stable identity, not position: a racing commit may have
    // shifted every numeric index since the caller read its snapshot.
    if !entries.iter().any(|e| e.id == entry_id) {
        return Err(QueueError::NotFound(entry_id));
    }

    entries.retain(|e| e.id != entry_id);
    Ok(ordering::recompute(entries))
}

fn advance(mut entries: Vec<QueueEntry>, doctor_id: Uuid) -> Result<Vec<QueueEntry>, QueueError> {
    let served = ordering::current_for(&entries, doctor_id)
        .ok_or(QueueError::EmptyQueue(doctor_id))?
        .id;

    entries.retain(|e| e.id != served);
    Ok(ordering::recompute(entries))
}

fn reorder(entries: Vec<QueueEntry>, order: &[Uuid]) -> Result<Vec<QueueEntry>, QueueError> {
    if order.len() != entries.len() {
        return Err(QueueError::Permutation(format!(
            "expected {} entries, got {}",
            entries.len(),
            order.len()
        )));
    }

    let mut by_id: HashMap<Uuid, QueueEntry> =
        entries.into_iter().map(|e| (e.id, e)).collect();

    let mut reordered = Vec::with_capacity(order.len());
    for entry_id in order {
        // A duplicated id fails here too: the first occurrence consumed it.
        match by_id.remove(entry_id) {
            Some(entry) => reordered.push(entry),
            None => {
                return Err(QueueError::Permutation(format!(
                    "entry {} is not in the current queue",
                    entry_id
                )));
            }
        }
    }

    Ok(ordering::recompute(reordered))
}
