use std::sync::Arc;

use tracing::warn;

use shared_models::auth::{Role, User, ValidationOutcome};
use shared_models::error::AppError;

use crate::clock::Clock;
use crate::jwt::{validate_token, validate_token_for_roles};

/// Token check placed in front of every protected entry point.
#[derive(Clone)]
pub struct AccessGateway {
    jwt_secret: Arc<str>,
    clock: Arc<dyn Clock>,
}

impl AccessGateway {
    pub fn new(jwt_secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            jwt_secret: Arc::from(jwt_secret),
            clock,
        }
    }

    pub fn validate(&self, token: &str, required_role: Role) -> ValidationOutcome {
        validate_token(token, &self.jwt_secret, required_role, self.clock.now())
    }

    /// Resolves the caller or rejects with the rejection kind only.
    pub fn authorize(&self, token: &str, allowed_roles: &[Role]) -> Result<User, AppError> {
        match validate_token_for_roles(token, &self.jwt_secret, allowed_roles, self.clock.now()) {
            ValidationOutcome::Valid(user) => Ok(user),
            ValidationOutcome::Invalid(reason) => {
                warn!("Rejected token for {:?}: {:?}", allowed_roles, reason);
                Err(reason.into())
            }
        }
    }
}
