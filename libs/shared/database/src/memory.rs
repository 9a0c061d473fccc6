use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use shared_models::entities::{Admin, Appointment, Doctor, Patient};

use crate::store::{ClinicStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    doctors: HashMap<Uuid, Doctor>,
    patients: HashMap<Uuid, Patient>,
    admins: HashMap<Uuid, Admin>,
    appointments: HashMap<Uuid, Appointment>,
}

/// Process-local [`ClinicStore`]. All tables sit behind one lock so multi-table
/// checks (such as the doctor reference check on delete) see a consistent view.
#[derive(Default)]
pub struct InMemoryClinicStore {
    tables: RwLock<Tables>,
}

impl InMemoryClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sorted_by_name(mut doctors: Vec<Doctor>) -> Vec<Doctor> {
    doctors.sort_by(|a, b| a.name.cmp(&b.name));
    doctors
}

fn sorted_by_time(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by_key(|a| a.appointment_time);
    appointments
}

impl ClinicStore for InMemoryClinicStore {
    fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        let mut tables = self.write();
        if tables.doctors.values().any(|d| d.email.eq_ignore_ascii_case(&doctor.email)) {
            return Err(StoreError::Duplicate {
                entity: "Doctor",
                field: "email",
                value: doctor.email,
            });
        }
        debug!("Inserting doctor {}", doctor.id);
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    fn update_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        let mut tables = self.write();
        if !tables.doctors.contains_key(&doctor.id) {
            return Err(StoreError::not_found("Doctor", doctor.id));
        }
        if tables
            .doctors
            .values()
            .any(|d| d.id != doctor.id && d.email.eq_ignore_ascii_case(&doctor.email))
        {
            return Err(StoreError::Duplicate {
                entity: "Doctor",
                field: "email",
                value: doctor.email,
            });
        }
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    fn delete_doctor(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write();
        if !tables.doctors.contains_key(&id) {
            return Err(StoreError::not_found("Doctor", id));
        }
        let count = tables.appointments.values().filter(|a| a.doctor_id == id).count();
        if count > 0 {
            return Err(StoreError::Referenced { entity: "Doctor", id, count });
        }
        tables.doctors.remove(&id);
        Ok(())
    }

    fn find_doctor_by_id(&self, id: Uuid) -> StoreResult<Doctor> {
        self.read()
            .doctors
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Doctor", id))
    }

    fn doctor_exists_by_email(&self, email: &str) -> bool {
        self.read().doctors.values().any(|d| d.email.eq_ignore_ascii_case(email))
    }

    fn list_doctors(&self) -> Vec<Doctor> {
        sorted_by_name(self.read().doctors.values().cloned().collect())
    }

    fn find_doctors_by_specialty(&self, specialty: &str) -> Vec<Doctor> {
        sorted_by_name(
            self.read()
                .doctors
                .values()
                .filter(|d| d.specialty.eq_ignore_ascii_case(specialty))
                .cloned()
                .collect(),
        )
    }

    fn find_doctors_by_name_and_specialty(&self, name: &str, specialty: &str) -> Vec<Doctor> {
        let needle = name.to_lowercase();
        sorted_by_name(
            self.read()
                .doctors
                .values()
                .filter(|d| d.name.to_lowercase().contains(&needle))
                .filter(|d| d.specialty.eq_ignore_ascii_case(specialty))
                .cloned()
                .collect(),
        )
    }

    fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        let mut tables = self.write();
        if tables.patients.values().any(|p| p.email.eq_ignore_ascii_case(&patient.email)) {
            return Err(StoreError::Duplicate {
                entity: "Patient",
                field: "email",
                value: patient.email,
            });
        }
        debug!("Inserting patient {}", patient.id);
        tables.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    fn update_patient(&self, patient: Patient) -> StoreResult<Patient> {
        let mut tables = self.write();
        if !tables.patients.contains_key(&patient.id) {
            return Err(StoreError::not_found("Patient", patient.id));
        }
        if tables
            .patients
            .values()
            .any(|p| p.id != patient.id && p.email.eq_ignore_ascii_case(&patient.email))
        {
            return Err(StoreError::Duplicate {
                entity: "Patient",
                field: "email",
                value: patient.email,
            });
        }
        tables.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    fn find_patient_by_id(&self, id: Uuid) -> StoreResult<Patient> {
        self.read()
            .patients
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Patient", id))
    }

    fn patient_exists_by_email(&self, email: &str) -> bool {
        self.read().patients.values().any(|p| p.email.eq_ignore_ascii_case(email))
    }

    fn insert_admin(&self, admin: Admin) -> StoreResult<Admin> {
        let mut tables = self.write();
        if tables.admins.values().any(|a| a.username == admin.username) {
            return Err(StoreError::Duplicate {
                entity: "Admin",
                field: "username",
                value: admin.username,
            });
        }
        tables.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    fn find_appointment_by_id(&self, id: Uuid) -> StoreResult<Appointment> {
        self.read()
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Appointment", id))
    }

    fn list_appointments_for_doctor_on_date(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Appointment> {
        sorted_by_time(
            self.read()
                .appointments
                .values()
                .filter(|a| a.doctor_id == doctor_id && a.appointment_date() == date)
                .cloned()
                .collect(),
        )
    }

    fn list_appointments_for_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        sorted_by_time(
            self.read()
                .appointments
                .values()
                .filter(|a| a.patient_id == patient_id)
                .cloned()
                .collect(),
        )
    }

    fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let mut tables = self.write();
        if tables.appointments.contains_key(&appointment.id) {
            return Err(StoreError::Duplicate {
                entity: "Appointment",
                field: "id",
                value: appointment.id.to_string(),
            });
        }
        // Checked under the same write lock that delete_doctor takes.
        if !tables.doctors.contains_key(&appointment.doctor_id) {
            return Err(StoreError::not_found("Doctor", appointment.doctor_id));
        }
        if !tables.patients.contains_key(&appointment.patient_id) {
            return Err(StoreError::not_found("Patient", appointment.patient_id));
        }
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn update_appointment(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let mut tables = self.write();
        match tables.appointments.get_mut(&appointment.id) {
            Some(existing) => {
                *existing = appointment.clone();
                Ok(appointment)
            }
            None => Err(StoreError::not_found("Appointment", appointment.id)),
        }
    }

    fn delete_appointment(&self, id: Uuid) -> StoreResult<()> {
        self.write()
            .appointments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Appointment", id))
    }
}
