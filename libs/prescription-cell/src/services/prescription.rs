use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_database::PrescriptionStore;
use shared_models::entities::Prescription;
use shared_models::error::AppError;
use shared_utils::state::AppState;
use shared_utils::validation;

use crate::models::{PrescriptionError, SavePrescriptionRequest};

pub struct PrescriptionService {
    prescriptions: Arc<dyn PrescriptionStore>,
}

impl PrescriptionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            prescriptions: Arc::clone(&state.prescriptions),
        }
    }

    pub async fn save_prescription(&self, request: SavePrescriptionRequest) -> Result<Prescription, PrescriptionError> {
        validate(&request).map_err(PrescriptionError::Validation)?;

        let prescription = Prescription {
            id: String::new(),
            appointment_id: request.appointment_id,
            patient_name: request.patient_name.trim().to_string(),
            medication: request.medication.trim().to_string(),
            dosage: request.dosage.trim().to_string(),
            doctor_notes: request.doctor_notes.filter(|notes| !notes.trim().is_empty()),
        };

        let saved = self.prescriptions.save(prescription).await?;
        info!("Prescription {} saved for appointment {}", saved.id, saved.appointment_id);

        Ok(saved)
    }

    pub async fn prescriptions_for_appointment(&self, appointment_id: Uuid) -> Result<Vec<Prescription>, PrescriptionError> {
        let found = self.prescriptions.find_by_appointment_id(appointment_id).await?;
        debug!("Found {} prescription(s) for appointment {}", found.len(), appointment_id);
        Ok(found)
    }
}

fn validate(request: &SavePrescriptionRequest) -> Result<(), AppError> {
    validation::length_between("Patient name", &request.patient_name, 3, 100)?;
    validation::length_between("Medication", &request.medication, 3, 100)?;
    validation::required("Dosage", &request.dosage)?;
    if let Some(notes) = &request.doctor_notes {
        validation::at_most("Doctor notes", notes, 200)?;
    }
    Ok(())
}
