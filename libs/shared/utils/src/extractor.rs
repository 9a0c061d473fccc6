use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use shared_models::auth::Role;
use shared_models::error::AppError;

use crate::gateway::AccessGateway;

/// Middleware state: the gateway plus the roles a route group admits.
#[derive(Clone)]
pub struct RoleGate {
    pub gateway: AccessGateway,
    pub roles: &'static [Role],
}

impl RoleGate {
    pub fn new(gateway: AccessGateway, roles: &'static [Role]) -> Self {
        Self { gateway, roles }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::Malformed)?
        .to_str()
        .map_err(|_| AppError::Malformed)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::Malformed),
    }
}

// Validates the bearer token and stores the resolved caller in request extensions
pub async fn require_roles(
    State(gate): State<RoleGate>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let user = gate.gateway.authorize(token, gate.roles)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
