use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::{ClinicStore, StoreError};
use shared_models::auth::User;
use shared_models::entities::Appointment;
use shared_utils::state::AppState;

use crate::models::{AppointmentError, AppointmentView, DoctorAppointmentQuery, PatientAppointmentQuery};
use crate::services::access::ensure_participant;

/// Read side of the appointment cell: dashboards and listings.
pub struct AppointmentQueryService {
    store: Arc<dyn ClinicStore>,
}

impl AppointmentQueryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    pub fn get_appointment(&self, caller: &User, appointment_id: Uuid) -> Result<AppointmentView, AppointmentError> {
        let appointment = self.store.find_appointment_by_id(appointment_id).map_err(|e| match e {
            StoreError::NotFound { .. } => AppointmentError::NotFound(appointment_id),
            other => AppointmentError::Store(other),
        })?;
        ensure_participant(caller, &appointment)?;

        Ok(self.views(vec![appointment]).remove(0))
    }

    pub fn patient_appointments(&self, patient_id: Uuid, query: &PatientAppointmentQuery) -> Vec<AppointmentView> {
        let mut appointments = self.store.list_appointments_for_patient(patient_id);
        if let Some(condition) = query.condition {
            appointments.retain(|a| a.status == condition.status());
        }

        let views = self.views(appointments);
        match non_blank(query.doctor_name.as_deref()) {
            Some(needle) => views
                .into_iter()
                .filter(|v| v.doctor_name.to_lowercase().contains(&needle))
                .collect(),
            None => views,
        }
    }

    pub fn doctor_appointments(&self, doctor_id: Uuid, query: &DoctorAppointmentQuery) -> Vec<AppointmentView> {
        let appointments = self.store.list_appointments_for_doctor_on_date(doctor_id, query.date);
        debug!("Doctor {} has {} appointment(s) on {}", doctor_id, appointments.len(), query.date);

        let views = self.views(appointments);
        match non_blank(query.patient_name.as_deref()) {
            Some(needle) => views
                .into_iter()
                .filter(|v| v.patient_name.to_lowercase().contains(&needle))
                .collect(),
            None => views,
        }
    }

    fn views(&self, appointments: Vec<Appointment>) -> Vec<AppointmentView> {
        let mut doctor_names: HashMap<Uuid, String> = HashMap::new();
        let mut patient_names: HashMap<Uuid, String> = HashMap::new();

        appointments
            .into_iter()
            .map(|appointment| {
                let doctor_name = doctor_names
                    .entry(appointment.doctor_id)
                    .or_insert_with(|| {
                        self.store
                            .find_doctor_by_id(appointment.doctor_id)
                            .map(|d| d.name)
                            .unwrap_or_default()
                    })
                    .clone();
                let patient_name = patient_names
                    .entry(appointment.patient_id)
                    .or_insert_with(|| {
                        self.store
                            .find_patient_by_id(appointment.patient_id)
                            .map(|p| p.name)
                            .unwrap_or_default()
                    })
                    .clone();

                AppointmentView {
                    end_time: appointment.end_time(),
                    appointment,
                    doctor_name,
                    patient_name,
                }
            })
            .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_lowercase)
}
