use std::sync::Arc;
use tracing::{debug, warn};

use shared_models::{auth::AuthSession, error::AppError};

use crate::models::{BookingMode, DoctorSummary, PatientSummary};
use crate::services::gateway::BookingBackend;

/// Doctor and patient lookups, normalized to one canonical shape each.
pub struct DirectoryService {
    backend: Arc<dyn BookingBackend>,
}

impl DirectoryService {
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self { backend }
    }

    pub async fn list_doctors(
        &self,
        mode: BookingMode,
        auth: &AuthSession,
    ) -> Result<Vec<DoctorSummary>, AppError> {
        let records = self.backend.list_doctors(mode, auth).await?;
        let total = records.len();

        let doctors: Vec<DoctorSummary> = records
            .into_iter()
            .filter_map(|record| record.normalize())
            .collect();

        if doctors.len() < total {
            warn!("Dropped {} doctor records without an id", total - doctors.len());
        }
        debug!("Loaded {} doctors", doctors.len());

        Ok(doctors)
    }

    pub async fn list_patients(&self, auth: &AuthSession) -> Result<Vec<PatientSummary>, AppError> {
        let records = self.backend.list_patients(auth).await?;
        let total = records.len();

        let patients: Vec<PatientSummary> = records
            .into_iter()
            .filter_map(|record| record.normalize())
            .collect();

        if patients.len() < total {
            warn!("Dropped {} patient records without an id", total - patients.len());
        }
        debug!("Loaded {} patients", patients.len());

        Ok(patients)
    }

    pub fn filter_patients<'a>(patients: &'a [PatientSummary], query: &str) -> Vec<&'a PatientSummary> {
        patients.iter().filter(|patient| patient.matches(query)).collect()
    }
}
