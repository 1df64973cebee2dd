use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::DoctorProfile;

/// Entry enrichment source for queue admissions: resolves a doctor id to
/// its display fields, scoped to the requesting clinic.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    /// Ok(None) means the doctor is unknown to this clinic.
    async fn lookup(&self, clinic_id: Uuid, doctor_id: Uuid) -> Result<Option<DoctorProfile>>;
}

pub struct SupabaseDoctorDirectory {
    supabase: SupabaseClient,
}

impl SupabaseDoctorDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDoctorDirectory {
    async fn lookup(&self, clinic_id: Uuid, doctor_id: Uuid) -> Result<Option<DoctorProfile>> {
        debug!("Looking up doctor {} for clinic {}", doctor_id, clinic_id);

        let path = format!(
            "/rest/v1/doctors?id=eq.{}&clinic_id=eq.{}",
            doctor_id, clinic_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await?;

        if result.is_empty() {
            return Ok(None);
        }

        let doctor: DoctorProfile = serde_json::from_value(result[0].clone())?;
        Ok(Some(doctor))
    }
}

/// In-memory directory for development and tests.
#[derive(Default)]
pub struct StaticDoctorDirectory {
    doctors: RwLock<HashMap<Uuid, DoctorProfile>>,
}

impl StaticDoctorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, doctor: DoctorProfile) {
        let mut doctors = self.doctors.write().unwrap();
        doctors.insert(doctor.id, doctor);
    }
}

#[async_trait]
impl DoctorDirectory for StaticDoctorDirectory {
    async fn lookup(&self, clinic_id: Uuid, doctor_id: Uuid) -> Result<Option<DoctorProfile>> {
        let doctors = self.doctors.read().unwrap();
        Ok(doctors
            .get(&doctor_id)
            .filter(|d| d.clinic_id == clinic_id)
            .cloned())
    }
}
