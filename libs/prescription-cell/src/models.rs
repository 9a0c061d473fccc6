use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePrescriptionRequest {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub medication: String,
    pub dosage: String,
    pub doctor_notes: Option<String>,
}

#[derive(Debug, Error)]
pub enum PrescriptionError {
    #[error(transparent)]
    Validation(AppError),

    #[error("Prescription store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<PrescriptionError> for AppError {
    fn from(err: PrescriptionError) -> Self {
        match err {
            PrescriptionError::Validation(inner) => inner,
            PrescriptionError::Store(inner) => AppError::ExternalService(inner.to_string()),
        }
    }
}
