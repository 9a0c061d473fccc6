// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::state::AppState;

use crate::models::{
    AppointmentView, BookAppointmentRequest, DoctorAppointmentQuery, PatientAppointmentQuery,
    RescheduleAppointmentRequest,
};
use crate::services::{AppointmentBookingService, AppointmentQueryService};

// ==============================================================================
// SCHEDULING
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = AppointmentBookingService::new(&state).book_appointment(&user, request)?;
    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment =
        AppointmentBookingService::new(&state).reschedule_appointment(&user, appointment_id, request)?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    AppointmentBookingService::new(&state).cancel_appointment(&user, appointment_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentBookingService::new(&state).complete_appointment(&user, appointment_id)?;
    Ok(Json(json!(appointment)))
}

// ==============================================================================
// LISTINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentView>, AppError> {
    let view = AppointmentQueryService::new(&state).get_appointment(&user, appointment_id)?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PatientAppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentQueryService::new(&state).patient_appointments(user.id, &query);

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<DoctorAppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentQueryService::new(&state).doctor_appointments(user.id, &query);

    Ok(Json(json!({
        "date": query.date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}
