use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use auth_cell::router::{auth_routes, dashboard_routes};
use doctor_cell::router::doctor_routes;
use patient_cell::router::patient_routes;
use prescription_cell::router::prescription_routes;
use shared_utils::state::AppState;

async fn home() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "clinic-api" }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/prescriptions", prescription_routes(state.clone()))
        .merge(dashboard_routes(state))
}
