// libs/appointment-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_models::auth::Role;
use shared_utils::extractor::{require_roles, RoleGate};
use shared_utils::state::AppState;

use crate::handlers;

const ANY_PARTICIPANT: &[Role] = &[Role::Patient, Role::Doctor, Role::Admin];
const CLINICIANS: &[Role] = &[Role::Doctor, Role::Admin];

pub fn appointment_routes(state: AppState) -> Router {
    let gateway = state.gateway();

    // Ownership is refined per appointment inside the services
    let participant_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment).delete(handlers::cancel_appointment),
        )
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(gateway.clone(), ANY_PARTICIPANT),
            require_roles,
        ));

    let clinician_routes = Router::new()
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(gateway.clone(), CLINICIANS),
            require_roles,
        ));

    let patient_routes = Router::new()
        .route("/mine", get(handlers::get_my_appointments))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(gateway.clone(), &[Role::Patient]),
            require_roles,
        ));

    let doctor_routes = Router::new()
        .route("/schedule", get(handlers::get_doctor_schedule))
        .layer(middleware::from_fn_with_state(
            RoleGate::new(gateway, &[Role::Doctor]),
            require_roles,
        ));

    Router::new()
        .merge(participant_routes)
        .merge(clinician_routes)
        .merge(patient_routes)
        .merge(doctor_routes)
        .with_state(state)
}
