// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::services::AvailabilityService;
use shared_database::{ClinicStore, StoreError};
use shared_models::auth::{Role, User};
use shared_models::entities::{Appointment, AppointmentStatus, Doctor, TimeRange};
use shared_utils::clock::Clock;
use shared_utils::locks::KeyedLocks;
use shared_utils::state::AppState;

use crate::models::{AppointmentError, BookAppointmentRequest, RescheduleAppointmentRequest};
use crate::services::access::ensure_participant;
use crate::services::lifecycle::AppointmentLifecycleService;

/// The only writer of appointments. Every check-then-write for a doctor runs under
/// that doctor's lock so two callers can never both see the same slot as free.
pub struct AppointmentBookingService {
    store: Arc<dyn ClinicStore>,
    clock: Arc<dyn Clock>,
    doctor_locks: Arc<KeyedLocks<Uuid>>,
    availability: AvailabilityService,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            clock: Arc::clone(&state.clock),
            doctor_locks: Arc::clone(&state.doctor_locks),
            availability: AvailabilityService::new(state),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub fn book_appointment(
        &self,
        caller: &User,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let patient_id = resolve_patient(caller, &request)?;
        if caller.role == Role::Doctor && request.doctor_id != caller.id {
            return Err(AppointmentError::NotOwner(
                "Doctors may only book into their own schedule".to_string(),
            ));
        }

        info!(
            "Booking appointment for patient {} with doctor {} at {}",
            patient_id, request.doctor_id, request.appointment_time
        );

        self.ensure_future(request.appointment_time)?;

        self.find_doctor(request.doctor_id)?;
        self.find_patient(patient_id)?;

        self.doctor_locks.with_lock(&request.doctor_id, || -> Result<Appointment, AppointmentError> {
            // Re-read under the lock; the doctor may have been edited or removed meanwhile.
            let doctor = self.find_doctor(request.doctor_id)?;
            self.ensure_slot_free(&doctor, request.appointment_time, None)?;

            let now = self.clock.now();
            let appointment = Appointment {
                id: Uuid::new_v4(),
                doctor_id: doctor.id,
                patient_id,
                appointment_time: request.appointment_time,
                status: AppointmentStatus::Scheduled,
                created_at: now,
                updated_at: now,
            };

            let appointment = self.store.insert_appointment(appointment).map_err(|e| match e {
                StoreError::NotFound { entity: "Doctor", .. } => AppointmentError::DoctorNotFound(doctor.id),
                StoreError::NotFound { entity: "Patient", .. } => AppointmentError::PatientNotFound(patient_id),
                other => AppointmentError::Store(other),
            })?;
            info!("Appointment {} booked", appointment.id);
            Ok(appointment)
        })
    }

    /// Moves a scheduled appointment; its current slot does not count against itself.
    pub fn reschedule_appointment(
        &self,
        caller: &User,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.find_appointment(appointment_id)?;
        ensure_participant(caller, &current)?;

        self.doctor_locks.with_lock(&current.doctor_id, || -> Result<Appointment, AppointmentError> {
            // Re-read under the lock; a concurrent cancel or complete may have won.
            let mut appointment = self.find_appointment(appointment_id)?;
            self.lifecycle.can_reschedule(appointment.status)?;
            self.ensure_future(request.new_start_time)?;

            let doctor = self.find_doctor(appointment.doctor_id)?;
            self.ensure_slot_free(&doctor, request.new_start_time, Some(appointment.id))?;

            debug!(
                "Rescheduling appointment {} from {} to {}",
                appointment.id, appointment.appointment_time, request.new_start_time
            );
            appointment.appointment_time = request.new_start_time;
            appointment.updated_at = self.clock.now();

            Ok(self.store.update_appointment(appointment)?)
        })
    }

    /// Removes the appointment and frees its slot.
    pub fn cancel_appointment(&self, caller: &User, appointment_id: Uuid) -> Result<(), AppointmentError> {
        let appointment = self.find_appointment(appointment_id)?;
        ensure_participant(caller, &appointment)?;

        self.doctor_locks.with_lock(&appointment.doctor_id, || {
            self.store.delete_appointment(appointment_id).map_err(|e| match e {
                StoreError::NotFound { .. } => AppointmentError::NotFound(appointment_id),
                other => AppointmentError::Store(other),
            })
        })?;

        info!("Appointment {} cancelled by {} {}", appointment_id, caller.role, caller.id);
        Ok(())
    }

    pub fn complete_appointment(&self, caller: &User, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let current = self.find_appointment(appointment_id)?;
        ensure_participant(caller, &current)?;

        self.doctor_locks.with_lock(&current.doctor_id, || -> Result<Appointment, AppointmentError> {
            let mut appointment = self.find_appointment(appointment_id)?;
            self.lifecycle
                .validate_status_transition(appointment.status, AppointmentStatus::Completed)?;

            appointment.status = AppointmentStatus::Completed;
            appointment.updated_at = self.clock.now();

            let appointment = self.store.update_appointment(appointment)?;
            info!("Appointment {} completed", appointment.id);
            Ok(appointment)
        })
    }

    fn ensure_future(&self, start: DateTime<Utc>) -> Result<(), AppointmentError> {
        let now = self.clock.now();
        if start <= now {
            warn!("Rejected appointment time {} (now: {})", start, now);
            return Err(AppointmentError::NotInFuture);
        }
        Ok(())
    }

    fn ensure_slot_free(
        &self,
        doctor: &Doctor,
        start: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        let wanted = TimeRange::slot_starting_at(start);
        let free = self
            .availability
            .free_ranges_excluding(doctor, start.date_naive(), exclude);

        if free.iter().any(|range| range.contains(&wanted)) {
            Ok(())
        } else {
            debug!("Slot {} is not free for doctor {}", wanted, doctor.id);
            Err(AppointmentError::SlotUnavailable)
        }
    }

    fn find_doctor(&self, doctor_id: Uuid) -> Result<Doctor, AppointmentError> {
        self.store.find_doctor_by_id(doctor_id).map_err(|e| match e {
            StoreError::NotFound { .. } => AppointmentError::DoctorNotFound(doctor_id),
            other => AppointmentError::Store(other),
        })
    }

    fn find_patient(&self, patient_id: Uuid) -> Result<(), AppointmentError> {
        self.store.find_patient_by_id(patient_id).map(|_| ()).map_err(|e| match e {
            StoreError::NotFound { .. } => AppointmentError::PatientNotFound(patient_id),
            other => AppointmentError::Store(other),
        })
    }

    fn find_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store.find_appointment_by_id(appointment_id).map_err(|e| match e {
            StoreError::NotFound { .. } => AppointmentError::NotFound(appointment_id),
            other => AppointmentError::Store(other),
        })
    }
}

fn resolve_patient(caller: &User, request: &BookAppointmentRequest) -> Result<Uuid, AppointmentError> {
    match (caller.role, request.patient_id) {
        (Role::Patient, None) => Ok(caller.id),
        (Role::Patient, Some(patient_id)) if patient_id == caller.id => Ok(patient_id),
        (Role::Patient, Some(_)) => Err(AppointmentError::NotOwner(
            "Patients may only book for themselves".to_string(),
        )),
        (_, Some(patient_id)) => Ok(patient_id),
        (_, None) => Err(AppointmentError::MissingPatient),
    }
}
