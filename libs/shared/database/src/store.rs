use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use shared_models::entities::{Admin, Appointment, Doctor, Patient};
use shared_models::error::AppError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} with {field} {value} already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{entity} {id} is still referenced by {count} appointment(s)")]
    Referenced {
        entity: &'static str,
        id: Uuid,
        count: usize,
    },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound { entity, id: id.to_string() }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::Duplicate { .. } | StoreError::Referenced { .. } => {
                AppError::Conflict(err.to_string())
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage boundary for the clinic's relational entities.
///
/// Lookups by key fail with [`StoreError::NotFound`]; list queries return an empty
/// vector when nothing matches. Every call is synchronous and atomic on its own.
pub trait ClinicStore: Send + Sync {
    // Doctors
    fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor>;
    fn update_doctor(&self, doctor: Doctor) -> StoreResult<Doctor>;
    /// Refuses with [`StoreError::Referenced`] while any appointment points at the doctor.
    fn delete_doctor(&self, id: Uuid) -> StoreResult<()>;
    fn find_doctor_by_id(&self, id: Uuid) -> StoreResult<Doctor>;
    fn doctor_exists_by_email(&self, email: &str) -> bool;
    /// All doctors ordered by name.
    fn list_doctors(&self) -> Vec<Doctor>;
    /// Case-insensitive exact specialty match.
    fn find_doctors_by_specialty(&self, specialty: &str) -> Vec<Doctor>;
    /// Case-insensitive name substring and case-insensitive exact specialty.
    fn find_doctors_by_name_and_specialty(&self, name: &str, specialty: &str) -> Vec<Doctor>;

    // Patients
    fn insert_patient(&self, patient: Patient) -> StoreResult<Patient>;
    fn update_patient(&self, patient: Patient) -> StoreResult<Patient>;
    fn find_patient_by_id(&self, id: Uuid) -> StoreResult<Patient>;
    fn patient_exists_by_email(&self, email: &str) -> bool;

    // Admins
    fn insert_admin(&self, admin: Admin) -> StoreResult<Admin>;

    // Appointments
    fn find_appointment_by_id(&self, id: Uuid) -> StoreResult<Appointment>;
    /// Ordered by start time.
    fn list_appointments_for_doctor_on_date(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Appointment>;
    /// Ordered by start time.
    fn list_appointments_for_patient(&self, patient_id: Uuid) -> Vec<Appointment>;
    /// Fails with [`StoreError::NotFound`] when the referenced doctor or patient is gone.
    fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment>;
    fn update_appointment(&self, appointment: Appointment) -> StoreResult<Appointment>;
    fn delete_appointment(&self, id: Uuid) -> StoreResult<()>;
}
