use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::state::AppState;

use crate::models::SavePrescriptionRequest;
use crate::services::PrescriptionService;

#[axum::debug_handler]
pub async fn save_prescription(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<SavePrescriptionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Doctor {} writing prescription for appointment {}", user.id, request.appointment_id);

    let prescription = PrescriptionService::new(&state).save_prescription(request).await?;
    Ok((StatusCode::CREATED, Json(json!(prescription))))
}

#[axum::debug_handler]
pub async fn get_prescriptions(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let prescriptions = PrescriptionService::new(&state)
        .prescriptions_for_appointment(appointment_id)
        .await?;

    Ok(Json(json!({
        "prescriptions": prescriptions,
        "total": prescriptions.len()
    })))
}
