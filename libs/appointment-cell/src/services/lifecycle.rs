// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::entities::AppointmentStatus;

use crate::models::AppointmentError;

#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {:?} to {:?}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {:?} -> {:?}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition(current_status));
        }

        Ok(())
    }

    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![AppointmentStatus::Completed],
            // Terminal
            AppointmentStatus::Completed => vec![],
        }
    }

    /// Only scheduled appointments may move in time.
    pub fn can_reschedule(&self, current_status: AppointmentStatus) -> Result<(), AppointmentError> {
        match current_status {
            AppointmentStatus::Scheduled => Ok(()),
            other => Err(AppointmentError::InvalidStatusTransition(other)),
        }
    }
}
