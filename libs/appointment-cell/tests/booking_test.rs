use std::sync::Arc;
use std::thread;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::models::{AppointmentError, BookAppointmentRequest, RescheduleAppointmentRequest};
use appointment_cell::services::AppointmentBookingService;
use doctor_cell::services::AvailabilityService;
use shared_models::auth::{Role, User};
use shared_models::entities::{AppointmentStatus, TimeRange};
use shared_utils::clock::FixedClock;
use shared_utils::state::AppState;
use shared_utils::test_utils::{hm, TestConfig, TestFixtures, TestUser};

fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, h, m, 0).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

struct Clinic {
    state: AppState,
    clock: Arc<FixedClock>,
    doctor: User,
    patient: User,
    admin: User,
}

fn clinic() -> Clinic {
    let (state, clock) = TestConfig::default().state_at(at(9, 12, 0));

    let doctor = state
        .store
        .insert_doctor(TestFixtures::doctor("Dr. Quinn", "Family Medicine", 1, hm(9, 0), hm(17, 0)))
        .unwrap();
    let patient = state
        .store
        .insert_patient(TestFixtures::patient("Jane Roe", "jane@clinic.test"))
        .unwrap();

    Clinic {
        doctor: TestUser::with_id(doctor.id, &doctor.email, Role::Doctor).to_user(),
        patient: TestUser::with_id(patient.id, &patient.email, Role::Patient).to_user(),
        admin: TestUser::admin("admin@clinic.test").to_user(),
        state,
        clock,
    }
}

fn request(clinic: &Clinic, start: DateTime<Utc>) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id: clinic.doctor.id,
        patient_id: None,
        appointment_time: start,
    }
}

fn second_patient(clinic: &Clinic, name: &str, email: &str) -> User {
    let patient = clinic
        .state
        .store
        .insert_patient(TestFixtures::patient(name, email))
        .unwrap();
    TestUser::with_id(patient.id, email, Role::Patient).to_user()
}

#[test]
fn test_booking_inside_free_range_succeeds() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);

    let appointment = service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.patient_id, clinic.patient.id);
    assert_eq!(appointment.end_time(), at(10, 11, 0));
}

#[test]
fn test_monday_scenario() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let availability = AvailabilityService::new(&clinic.state);

    assert_eq!(
        availability.available_slots(clinic.doctor.id, monday()).unwrap(),
        vec![TimeRange::new(at(10, 9, 0), at(10, 17, 0))]
    );

    service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();

    assert_eq!(
        availability.available_slots(clinic.doctor.id, monday()).unwrap(),
        vec![
            TimeRange::new(at(10, 9, 0), at(10, 10, 0)),
            TimeRange::new(at(10, 11, 0), at(10, 17, 0)),
        ]
    );

    let other = second_patient(&clinic, "John Doe", "john@clinic.test");
    assert_matches!(
        service.book_appointment(&other, request(&clinic, at(10, 10, 30))),
        Err(AppointmentError::SlotUnavailable)
    );
}

#[test]
fn test_abutting_bookings_do_not_conflict() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let other = second_patient(&clinic, "John Doe", "john@clinic.test");

    service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();
    service.book_appointment(&other, request(&clinic, at(10, 11, 0))).unwrap();
    service.book_appointment(&other, request(&clinic, at(10, 9, 0))).unwrap();
}

#[test]
fn test_booking_outside_working_hours_conflicts() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);

    assert_matches!(
        service.book_appointment(&clinic.patient, request(&clinic, at(10, 16, 30))),
        Err(AppointmentError::SlotUnavailable)
    );
    assert_matches!(
        service.book_appointment(&clinic.patient, request(&clinic, at(11, 10, 0))),
        Err(AppointmentError::SlotUnavailable)
    );
}

#[test]
fn test_booking_in_the_past_is_invalid() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);

    assert_matches!(
        service.book_appointment(&clinic.patient, request(&clinic, at(9, 12, 0))),
        Err(AppointmentError::NotInFuture)
    );
    assert_matches!(
        service.book_appointment(&clinic.patient, request(&clinic, at(3, 10, 0))),
        Err(AppointmentError::NotInFuture)
    );
}

#[test]
fn test_unknown_doctor_or_patient_is_not_found() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);

    let mut unknown_doctor = request(&clinic, at(10, 10, 0));
    unknown_doctor.doctor_id = Uuid::new_v4();
    assert_matches!(
        service.book_appointment(&clinic.patient, unknown_doctor),
        Err(AppointmentError::DoctorNotFound(_))
    );

    let mut unknown_patient = request(&clinic, at(10, 10, 0));
    unknown_patient.patient_id = Some(Uuid::new_v4());
    assert_matches!(
        service.book_appointment(&clinic.admin, unknown_patient),
        Err(AppointmentError::PatientNotFound(_))
    );
}

#[test]
fn test_patient_cannot_book_for_someone_else() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let other = second_patient(&clinic, "John Doe", "john@clinic.test");

    let mut on_behalf = request(&clinic, at(10, 10, 0));
    on_behalf.patient_id = Some(other.id);
    assert_matches!(
        service.book_appointment(&clinic.patient, on_behalf),
        Err(AppointmentError::NotOwner(_))
    );
}

#[test]
fn test_admin_must_name_the_patient() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);

    assert_matches!(
        service.book_appointment(&clinic.admin, request(&clinic, at(10, 10, 0))),
        Err(AppointmentError::MissingPatient)
    );

    let mut named = request(&clinic, at(10, 10, 0));
    named.patient_id = Some(clinic.patient.id);
    assert!(service.book_appointment(&clinic.admin, named).is_ok());
}

#[test]
fn test_reschedule_excludes_own_slot() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let booked = service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();

    // Overlaps only its own current slot
    let moved = service
        .reschedule_appointment(
            &clinic.patient,
            booked.id,
            RescheduleAppointmentRequest { new_start_time: at(10, 10, 30) },
        )
        .unwrap();

    assert_eq!(moved.id, booked.id);
    assert_eq!(moved.appointment_time, at(10, 10, 30));
    assert_eq!(
        clinic.state.store.find_appointment_by_id(booked.id).unwrap().appointment_time,
        at(10, 10, 30)
    );
}

#[test]
fn test_reschedule_onto_other_booking_conflicts() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let other = second_patient(&clinic, "John Doe", "john@clinic.test");

    let mine = service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();
    service.book_appointment(&other, request(&clinic, at(10, 13, 0))).unwrap();

    assert_matches!(
        service.reschedule_appointment(
            &clinic.patient,
            mine.id,
            RescheduleAppointmentRequest { new_start_time: at(10, 12, 30) },
        ),
        Err(AppointmentError::SlotUnavailable)
    );
}

#[test]
fn test_reschedule_of_completed_is_invalid_state() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let booked = service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();
    service.complete_appointment(&clinic.doctor, booked.id).unwrap();

    assert_matches!(
        service.reschedule_appointment(
            &clinic.patient,
            booked.id,
            RescheduleAppointmentRequest { new_start_time: at(10, 14, 0) },
        ),
        Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Completed))
    );
}

#[test]
fn test_complete_twice_fails_second_time() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let booked = service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();

    let completed = service.complete_appointment(&clinic.doctor, booked.id).unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);

    assert_matches!(
        service.complete_appointment(&clinic.doctor, booked.id),
        Err(AppointmentError::InvalidStatusTransition(_))
    );
}

#[test]
fn test_cancel_then_rebook_same_slot() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let booked = service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();

    service.cancel_appointment(&clinic.patient, booked.id).unwrap();
    assert_matches!(
        service.cancel_appointment(&clinic.patient, booked.id),
        Err(AppointmentError::NotFound(id)) if id == booked.id
    );

    let rebooked = service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();
    assert_ne!(rebooked.id, booked.id);
}

#[test]
fn test_only_participants_may_touch_an_appointment() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);
    let booked = service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).unwrap();

    let stranger = second_patient(&clinic, "John Doe", "john@clinic.test");
    let other_doctor = TestUser::doctor("other@clinic.test").to_user();

    assert_matches!(
        service.cancel_appointment(&stranger, booked.id),
        Err(AppointmentError::NotOwner(_))
    );
    assert_matches!(
        service.complete_appointment(&other_doctor, booked.id),
        Err(AppointmentError::NotOwner(_))
    );
    assert_matches!(
        service.reschedule_appointment(
            &stranger,
            booked.id,
            RescheduleAppointmentRequest { new_start_time: at(10, 14, 0) },
        ),
        Err(AppointmentError::NotOwner(_))
    );

    service.cancel_appointment(&clinic.admin, booked.id).unwrap();
}

#[test]
fn test_clock_drives_future_check() {
    let clinic = clinic();
    let service = AppointmentBookingService::new(&clinic.state);

    clinic.clock.set(at(10, 10, 0));
    assert_matches!(
        service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))),
        Err(AppointmentError::NotInFuture)
    );

    clinic.clock.advance(-Duration::minutes(1));
    assert!(service.book_appointment(&clinic.patient, request(&clinic, at(10, 10, 0))).is_ok());
}

#[test]
fn test_concurrent_overlapping_bookings_single_winner() {
    let clinic = clinic();
    let attempts = 8;

    let workers: Vec<_> = (0..attempts)
        .map(|i| {
            let state = clinic.state.clone();
            let doctor_id = clinic.doctor.id;
            let patient = second_patient(&clinic, &format!("Patient {}", i), &format!("p{}@clinic.test", i));
            // Every start lies within one hour of 10:00, so all ranges overlap pairwise
            let start = at(10, 10, 0) + Duration::minutes(5 * i as i64);

            thread::spawn(move || {
                AppointmentBookingService::new(&state).book_appointment(
                    &patient,
                    BookAppointmentRequest {
                        doctor_id,
                        patient_id: None,
                        appointment_time: start,
                    },
                )
            })
        })
        .collect();

    let results: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppointmentError::SlotUnavailable)))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, attempts - 1);
    assert_eq!(
        clinic
            .state
            .store
            .list_appointments_for_doctor_on_date(clinic.doctor.id, monday())
            .len(),
        1
    );
}
