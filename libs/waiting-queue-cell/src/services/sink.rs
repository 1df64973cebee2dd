use async_trait::async_trait;
use tracing::debug;

use appointment_cell::{ConsultationField, ConsultationRecorder};

use crate::error::QueueError;
use crate::models::{ConsultationEvent, ConsultationPhase};

/// Outbound port for consultation side effects. Delivery is
/// at-least-once with a single attempt per event; a failure must never
/// roll back the queue commit that produced the event.
#[async_trait]
pub trait ConsultationSink: Send + Sync {
    async fn record(&self, event: &ConsultationEvent) -> Result<(), QueueError>;
}

#[async_trait]
impl ConsultationSink for ConsultationRecorder {
    async fn record(&self, event: &ConsultationEvent) -> Result<(), QueueError> {
        let field = match event.phase {
            ConsultationPhase::Started => ConsultationField::Start,
            ConsultationPhase::Ended => ConsultationField::End,
        };

        ConsultationRecorder::record(self, event.appointment_id, field, event.at)
            .await
            .map_err(|e| QueueError::SinkDelivery(e.to_string()))
    }
}

/// Sink for deployments without appointment storage (display-only
/// queues) and for tests.
pub struct NullSink;

#[async_trait]
impl ConsultationSink for NullSink {
    async fn record(&self, event: &ConsultationEvent) -> Result<(), QueueError> {
        debug!(
            "Dropping consultation event for appointment {} ({:?})",
            event.appointment_id, event.phase
        );
        Ok(())
    }
}
