use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::entities::{TimeRange, WorkingHours};
use shared_models::error::AppError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub working_hours: Vec<WorkingHours>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub working_hours: Option<Vec<WorkingHours>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[serde(alias = "am")]
    AM,
    #[serde(alias = "pm")]
    PM,
}

/// Directory filters; every field is optional and they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSearchQuery {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub time: Option<TimeOfDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailableSlotsResponse {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<TimeRange>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum DoctorError {
    #[error("Doctor {0} not found")]
    NotFound(Uuid),

    #[error("Cannot compute availability for past date {0}")]
    PastDate(NaiveDate),

    #[error("Doctor with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Invalid working hours: {0}")]
    InvalidWorkingHours(String),

    #[error(transparent)]
    Validation(AppError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::PastDate(_) | DoctorError::InvalidWorkingHours(_) => {
                AppError::InvalidArgument(err.to_string())
            }
            DoctorError::DuplicateEmail(_) => AppError::Conflict(err.to_string()),
            DoctorError::Validation(inner) => inner,
            DoctorError::Store(inner) => inner.into(),
        }
    }
}
