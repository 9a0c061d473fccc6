use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use shared_models::auth::{Role, TokenResponse, ValidationOutcome};
use shared_models::error::AppError;
use shared_utils::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

fn parse_role(raw: &str) -> Result<Role, AppError> {
    raw.parse::<Role>().map_err(AppError::InvalidArgument)
}

/// Checks a bearer token against `?role=` and reports the resolved subject.
pub async fn validate_token(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<TokenResponse>, AppError> {
    let role = parse_role(&query.role)?;
    let TypedHeader(auth) = auth.ok_or(AppError::Malformed)?;
    debug!("Validating token for role {}", role);

    let user = state.gateway().validate(auth.token(), role).into_result()?;

    Ok(Json(TokenResponse {
        valid: true,
        subject: user.id,
        role: user.role,
        expires_at: user.expires_at,
    }))
}

/// Same check as [`validate_token`] but always answers 200 with a verdict.
pub async fn verify_token(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let role = parse_role(&query.role)?;
    let Some(TypedHeader(auth)) = auth else {
        return Ok(Json(json!({ "valid": false, "reason": "malformed" })));
    };

    match state.gateway().validate(auth.token(), role) {
        ValidationOutcome::Valid(_) => Ok(Json(json!({ "valid": true }))),
        ValidationOutcome::Invalid(reason) => Ok(Json(json!({ "valid": false, "reason": reason }))),
    }
}

// ==============================================================================
// DASHBOARDS
// ==============================================================================

fn dashboard(state: &AppState, token: &str, role: Role, view: &str) -> Response {
    match state.gateway().validate(token, role) {
        ValidationOutcome::Valid(user) => {
            info!("Opening {} for {}", view, user.id);
            Json(json!({
                "view": view,
                "subject": user.id,
                "role": user.role,
            }))
            .into_response()
        }
        ValidationOutcome::Invalid(reason) => {
            debug!("Dashboard {} refused: {:?}", view, reason);
            Redirect::to("/").into_response()
        }
    }
}

pub async fn admin_dashboard(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    dashboard(&state, &token, Role::Admin, "admin/adminDashboard")
}

pub async fn doctor_dashboard(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    dashboard(&state, &token, Role::Doctor, "doctor/doctorDashboard")
}
