use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_models::auth::Role;
use shared_utils::extractor::{require_roles, RoleGate};
use shared_utils::state::AppState;

use crate::handlers::*;

pub fn patient_routes(state: AppState) -> Router {
    let gateway = state.gateway();

    let signup = Router::new().route("/", post(register_patient));

    let self_service = Router::new()
        .route("/me", get(get_my_profile).put(update_my_profile))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(gateway.clone(), &[Role::Patient]),
            require_roles,
        ));

    let staff = Router::new()
        .route("/{patient_id}", get(get_patient))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(gateway, &[Role::Doctor, Role::Admin]),
            require_roles,
        ));

    Router::new()
        .merge(signup)
        .merge(self_service)
        .merge(staff)
        .with_state(state)
}
