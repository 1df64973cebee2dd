use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::ConsultationField;

/// Writes consultation start/end timestamps onto appointment records.
/// One attempt per call; retry policy belongs to the caller.
pub struct ConsultationRecorder {
    supabase: SupabaseClient,
}

impl ConsultationRecorder {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn record(
        &self,
        appointment_id: Uuid,
        field: ConsultationField,
        at: DateTime<Utc>,
    ) -> Result<()> {
        debug!(
            "Recording {} for appointment {}",
            field.column(),
            appointment_id
        );

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let mut update = serde_json::Map::new();
        update.insert(field.column().to_string(), json!(at.to_rfc3339()));
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            None,
            Some(Value::Object(update)),
            Some(headers),
        ).await?;

        if result.is_empty() {
            return Err(anyhow!("Appointment {} not found", appointment_id));
        }

        Ok(())
    }

    pub async fn record_started(&self, appointment_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        self.record(appointment_id, ConsultationField::Start, at).await
    }

    pub async fn record_ended(&self, appointment_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        self.record(appointment_id, ConsultationField::End, at).await
    }
}
