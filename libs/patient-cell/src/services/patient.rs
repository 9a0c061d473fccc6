use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{ClinicStore, StoreError};
use shared_models::entities::Patient;
use shared_utils::clock::Clock;
use shared_utils::state::AppState;
use shared_utils::validation;

use crate::models::{CreatePatientRequest, PatientError, UpdatePatientRequest};

pub struct PatientService {
    store: Arc<dyn ClinicStore>,
    clock: Arc<dyn Clock>,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            clock: Arc::clone(&state.clock),
        }
    }

    /// Public signup. The password is kept as an opaque credential.
    pub fn register_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Registering patient: {}", request.email);

        validate_details(&request.name, &request.phone, &request.address)?;
        validation::email(&request.email).map_err(PatientError::Validation)?;
        validation::at_least("Password", &request.password, 6).map_err(PatientError::Validation)?;

        let email = request.email.trim().to_string();
        if self.store.patient_exists_by_email(&email) {
            return Err(PatientError::EmailAlreadyExists { email });
        }

        let now = self.clock.now();
        let patient = Patient {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email,
            credential: request.password,
            phone: request.phone,
            address: request.address,
            created_at: now,
            updated_at: now,
        };

        let patient = self.store.insert_patient(patient).map_err(|e| match e {
            StoreError::Duplicate { value, .. } => PatientError::EmailAlreadyExists { email: value },
            other => PatientError::Store(other),
        })?;
        info!("Patient {} registered", patient.id);

        Ok(patient)
    }

    pub fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        self.store.find_patient_by_id(patient_id).map_err(|e| match e {
            StoreError::NotFound { .. } => PatientError::NotFound(patient_id),
            other => PatientError::Store(other),
        })
    }

    pub fn update_patient(&self, patient_id: Uuid, request: UpdatePatientRequest) -> Result<Patient, PatientError> {
        let mut patient = self.get_patient(patient_id)?;

        if let Some(name) = request.name {
            patient.name = name.trim().to_string();
        }
        if let Some(phone) = request.phone {
            patient.phone = phone;
        }
        if let Some(address) = request.address {
            patient.address = address;
        }

        validate_details(&patient.name, &patient.phone, &patient.address)?;
        patient.updated_at = self.clock.now();

        Ok(self.store.update_patient(patient)?)
    }
}

fn validate_details(name: &str, phone: &str, address: &str) -> Result<(), PatientError> {
    validation::length_between("Name", name, 3, 100).map_err(PatientError::Validation)?;
    validation::phone(phone).map_err(PatientError::Validation)?;
    validation::required("Address", address).map_err(PatientError::Validation)?;
    validation::at_most("Address", address, 255).map_err(PatientError::Validation)?;
    Ok(())
}
