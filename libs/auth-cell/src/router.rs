use axum::{
    routing::{get, post},
    Router,
};

use shared_utils::state::AppState;

use crate::handlers;

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/validate", post(handlers::validate_token))
        .route("/verify", post(handlers::verify_token))
        .with_state(state)
}

/// Token travels in the path; any rejection redirects home.
pub fn dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route("/adminDashboard/{token}", get(handlers::admin_dashboard))
        .route("/doctorDashboard/{token}", get(handlers::doctor_dashboard))
        .with_state(state)
}
