use std::sync::Arc;

use chrono::Timelike;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{ClinicStore, StoreError};
use shared_models::entities::{Doctor, WorkingHours};
use shared_utils::clock::Clock;
use shared_utils::locks::KeyedLocks;
use shared_utils::state::AppState;
use shared_utils::validation;

use crate::models::{CreateDoctorRequest, DoctorError, DoctorSearchQuery, TimeOfDay, UpdateDoctorRequest};

pub struct DoctorService {
    store: Arc<dyn ClinicStore>,
    clock: Arc<dyn Clock>,
    doctor_locks: Arc<KeyedLocks<Uuid>>,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            clock: Arc::clone(&state.clock),
            doctor_locks: Arc::clone(&state.doctor_locks),
        }
    }

    pub fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor profile for: {}", request.email);

        validate_profile(&request.name, &request.specialty, &request.email, &request.phone)?;
        validate_working_hours(&request.working_hours)?;

        if self.store.doctor_exists_by_email(&request.email) {
            return Err(DoctorError::DuplicateEmail(request.email));
        }

        let now = self.clock.now();
        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            specialty: request.specialty.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone,
            working_hours: request.working_hours,
            created_at: now,
            updated_at: now,
        };

        let doctor = self.store.insert_doctor(doctor).map_err(duplicate_as_conflict)?;
        info!("Doctor {} created", doctor.id);

        Ok(doctor)
    }

    /// Runs under the doctor's lock so working hours never change mid-booking.
    pub fn update_doctor(&self, doctor_id: Uuid, request: UpdateDoctorRequest) -> Result<Doctor, DoctorError> {
        self.doctor_locks
            .with_lock(&doctor_id, || self.apply_update(doctor_id, request))
    }

    fn apply_update(&self, doctor_id: Uuid, request: UpdateDoctorRequest) -> Result<Doctor, DoctorError> {
        let mut doctor = self.get_doctor(doctor_id)?;

        if let Some(name) = request.name {
            doctor.name = name.trim().to_string();
        }
        if let Some(specialty) = request.specialty {
            doctor.specialty = specialty.trim().to_string();
        }
        if let Some(email) = request.email {
            let email = email.trim().to_string();
            if !email.eq_ignore_ascii_case(&doctor.email) && self.store.doctor_exists_by_email(&email) {
                return Err(DoctorError::DuplicateEmail(email));
            }
            doctor.email = email;
        }
        if let Some(phone) = request.phone {
            doctor.phone = phone;
        }
        if let Some(hours) = request.working_hours {
            validate_working_hours(&hours)?;
            doctor.working_hours = hours;
        }

        validate_profile(&doctor.name, &doctor.specialty, &doctor.email, &doctor.phone)?;
        doctor.updated_at = self.clock.now();

        let doctor = self.store.update_doctor(doctor).map_err(duplicate_as_conflict)?;
        debug!("Doctor {} updated", doctor.id);

        Ok(doctor)
    }

    /// Fails with a conflict while any appointment still references the doctor.
    pub fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        self.doctor_locks.with_lock(&doctor_id, || {
            self.store.delete_doctor(doctor_id).map_err(|e| match e {
                StoreError::NotFound { .. } => DoctorError::NotFound(doctor_id),
                other => DoctorError::Store(other),
            })
        })?;
        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }

    pub fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        self.store.find_doctor_by_id(doctor_id).map_err(|e| match e {
            StoreError::NotFound { .. } => DoctorError::NotFound(doctor_id),
            other => DoctorError::Store(other),
        })
    }

    pub fn list_doctors(&self) -> Vec<Doctor> {
        self.store.list_doctors()
    }

    pub fn search_doctors(&self, query: &DoctorSearchQuery) -> Vec<Doctor> {
        let name = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let specialty = query.specialty.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let candidates = match (name, specialty) {
            (Some(name), Some(specialty)) => self.store.find_doctors_by_name_and_specialty(name, specialty),
            (None, Some(specialty)) => self.store.find_doctors_by_specialty(specialty),
            (Some(name), None) => {
                let needle = name.to_lowercase();
                self.store
                    .list_doctors()
                    .into_iter()
                    .filter(|d| d.name.to_lowercase().contains(&needle))
                    .collect()
            }
            (None, None) => self.store.list_doctors(),
        };

        match query.time {
            Some(time) => candidates
                .into_iter()
                .filter(|doctor| works_during(doctor, time))
                .collect(),
            None => candidates,
        }
    }
}

/// A doctor works in the morning when any window opens before noon.
pub fn works_during(doctor: &Doctor, time: TimeOfDay) -> bool {
    doctor.working_hours.iter().any(|hours| match time {
        TimeOfDay::AM => hours.start_time.hour() < 12,
        TimeOfDay::PM => hours.start_time.hour() >= 12,
    })
}

fn validate_profile(name: &str, specialty: &str, email: &str, phone: &str) -> Result<(), DoctorError> {
    validation::length_between("Name", name, 3, 100).map_err(DoctorError::Validation)?;
    validation::length_between("Specialty", specialty, 3, 50).map_err(DoctorError::Validation)?;
    validation::email(email).map_err(DoctorError::Validation)?;
    validation::phone(phone).map_err(DoctorError::Validation)?;
    Ok(())
}

fn validate_working_hours(hours: &[WorkingHours]) -> Result<(), DoctorError> {
    for window in hours {
        if !(0..=6).contains(&window.day_of_week) {
            return Err(DoctorError::InvalidWorkingHours(
                "day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
            ));
        }
        if window.start_time >= window.end_time {
            return Err(DoctorError::InvalidWorkingHours(format!(
                "start {} must be before end {}",
                window.start_time, window.end_time
            )));
        }
    }
    Ok(())
}

fn duplicate_as_conflict(err: StoreError) -> DoctorError {
    match err {
        StoreError::Duplicate { value, .. } => DoctorError::DuplicateEmail(value),
        other => DoctorError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_utils::test_utils::{hm, TestConfig};

    fn service() -> DoctorService {
        DoctorService::new(&AppState::in_memory(TestConfig::default().to_app_config()))
    }

    fn request(name: &str, email: &str, day: i32, start: u32, end: u32) -> CreateDoctorRequest {
        CreateDoctorRequest {
            name: name.to_string(),
            specialty: "Cardiology".to_string(),
            email: email.to_string(),
            phone: "5550001111".to_string(),
            working_hours: vec![WorkingHours {
                day_of_week: day,
                start_time: hm(start, 0),
                end_time: hm(end, 0),
            }],
        }
    }

    #[test]
    fn test_create_rejects_duplicate_email() {
        let service = service();
        service.create_doctor(request("Dr. House", "house@clinic.test", 1, 9, 17)).unwrap();

        let duplicate = service.create_doctor(request("Dr. Wilson", "HOUSE@clinic.test", 2, 9, 17));
        assert_matches!(duplicate, Err(DoctorError::DuplicateEmail(_)));
    }

    #[test]
    fn test_create_rejects_inverted_hours() {
        let result = service().create_doctor(request("Dr. House", "house@clinic.test", 1, 17, 9));
        assert_matches!(result, Err(DoctorError::InvalidWorkingHours(_)));
    }

    #[test]
    fn test_create_rejects_bad_phone() {
        let mut bad = request("Dr. House", "house@clinic.test", 1, 9, 17);
        bad.phone = "555-000".to_string();
        assert_matches!(service().create_doctor(bad), Err(DoctorError::Validation(_)));
    }

    #[test]
    fn test_search_by_name_specialty_and_time() {
        let service = service();
        service.create_doctor(request("Dr. House", "house@clinic.test", 1, 9, 12)).unwrap();
        service.create_doctor(request("Dr. Houseman", "houseman@clinic.test", 1, 13, 17)).unwrap();
        let mut other = request("Dr. Grey", "grey@clinic.test", 1, 9, 17);
        other.specialty = "Surgery".to_string();
        service.create_doctor(other).unwrap();

        let by_name = service.search_doctors(&DoctorSearchQuery {
            name: Some("house".into()),
            ..Default::default()
        });
        assert_eq!(by_name.len(), 2);

        let afternoon = service.search_doctors(&DoctorSearchQuery {
            name: Some("house".into()),
            specialty: Some("cardiology".into()),
            time: Some(TimeOfDay::PM),
        });
        assert_eq!(afternoon.len(), 1);
        assert_eq!(afternoon[0].name, "Dr. Houseman");

        let surgeons = service.search_doctors(&DoctorSearchQuery {
            specialty: Some("SURGERY".into()),
            ..Default::default()
        });
        assert_eq!(surgeons.len(), 1);
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let service = service();
        let doctor = service.create_doctor(request("Dr. House", "house@clinic.test", 1, 9, 17)).unwrap();

        let updated = service
            .update_doctor(
                doctor.id,
                UpdateDoctorRequest {
                    specialty: Some("Diagnostics".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.specialty, "Diagnostics");
        assert_eq!(updated.email, doctor.email);
        assert_eq!(updated.working_hours, doctor.working_hours);
    }

    #[test]
    fn test_missing_doctor_is_not_found() {
        let id = Uuid::new_v4();
        assert_matches!(service().get_doctor(id), Err(DoctorError::NotFound(missing)) if missing == id);
        assert_matches!(service().delete_doctor(id), Err(DoctorError::NotFound(_)));
    }
}
