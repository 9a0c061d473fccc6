// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::entities::{Appointment, AppointmentStatus};
use shared_models::error::AppError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// `patient_id` may be omitted when the caller is the patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub appointment_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
}

/// Patient-side filter. `pending` maps to Scheduled, `consulted` to Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentCondition {
    Pending,
    Consulted,
}

impl AppointmentCondition {
    pub fn status(self) -> AppointmentStatus {
        match self {
            AppointmentCondition::Pending => AppointmentStatus::Scheduled,
            AppointmentCondition::Consulted => AppointmentStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientAppointmentQuery {
    pub condition: Option<AppointmentCondition>,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorAppointmentQuery {
    pub date: NaiveDate,
    pub patient_name: Option<String>,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

/// Appointment flattened with the names the dashboards display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub end_time: DateTime<Utc>,
    pub doctor_name: String,
    pub patient_name: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum AppointmentError {
    #[error("Appointment {0} not found")]
    NotFound(Uuid),

    #[error("Doctor {0} not found")]
    DoctorNotFound(Uuid),

    #[error("Patient {0} not found")]
    PatientNotFound(Uuid),

    #[error("Appointment time must be in the future")]
    NotInFuture,

    #[error("patient_id is required")]
    MissingPatient,

    #[error("Requested slot is unavailable")]
    SlotUnavailable,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("{0}")]
    NotOwner(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_)
            | AppointmentError::DoctorNotFound(_)
            | AppointmentError::PatientNotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::NotInFuture | AppointmentError::MissingPatient => {
                AppError::InvalidArgument(err.to_string())
            }
            AppointmentError::SlotUnavailable => AppError::Conflict(err.to_string()),
            AppointmentError::InvalidStatusTransition(_) => AppError::InvalidState(err.to_string()),
            AppointmentError::NotOwner(message) => AppError::Forbidden(message),
            AppointmentError::Store(inner) => inner.into(),
        }
    }
}
