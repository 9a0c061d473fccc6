use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_models::auth::Role;
use shared_utils::extractor::{require_roles, RoleGate};
use shared_utils::state::AppState;

use crate::handlers;

pub fn prescription_routes(state: AppState) -> Router {
    let gateway = state.gateway();

    let doctor_routes = Router::new()
        .route("/", post(handlers::save_prescription))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(gateway.clone(), &[Role::Doctor]),
            require_roles,
        ));

    let reader_routes = Router::new()
        .route("/appointment/{appointment_id}", get(handlers::get_prescriptions))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(gateway, &[Role::Doctor, Role::Patient]),
            require_roles,
        ));

    Router::new()
        .merge(doctor_routes)
        .merge(reader_routes)
        .with_state(state)
}
