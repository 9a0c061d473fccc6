use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_models::auth::Role;
use shared_utils::extractor::{require_roles, RoleGate};
use shared_utils::state::AppState;

use crate::handlers;

pub fn doctor_routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor));

    let member_gate = RoleGate::new(state.gateway(), &[Role::Patient, Role::Doctor, Role::Admin]);
    let member_routes = Router::new()
        .route("/{doctor_id}/available-slots", get(handlers::get_available_slots))
        .layer(middleware::from_fn_with_state(member_gate, require_roles));

    // Directory maintenance is admin-only
    let admin_gate = RoleGate::new(state.gateway(), &[Role::Admin]);
    let admin_routes = Router::new()
        .route("/", post(handlers::create_doctor))
        .route("/{doctor_id}", put(handlers::update_doctor).delete(handlers::delete_doctor))
        .layer(middleware::from_fn_with_state(admin_gate, require_roles));

    Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .merge(admin_routes)
        .with_state(state)
}
