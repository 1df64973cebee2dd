use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Queue entry not found: {0}")]
    NotFound(Uuid),

    #[error("Reorder rejected: {0}")]
    Permutation(String),

    #[error("No patient waiting for doctor {0}")]
    EmptyQueue(Uuid),

    #[error("Doctor {0} is not registered with this clinic")]
    UnknownDoctor(Uuid),

    #[error("Doctor directory unavailable: {0}")]
    Directory(String),

    #[error("Consultation record delivery failed: {0}")]
    SinkDelivery(String),
}
