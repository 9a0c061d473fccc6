use shared_models::auth::{Role, User};
use shared_models::entities::Appointment;

use crate::models::AppointmentError;

/// Admins act on anything; doctors and patients only on appointments that name them.
pub fn ensure_participant(caller: &User, appointment: &Appointment) -> Result<(), AppointmentError> {
    let allowed = match caller.role {
        Role::Admin => true,
        Role::Doctor => appointment.doctor_id == caller.id,
        Role::Patient => appointment.patient_id == caller.id,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppointmentError::NotOwner(format!(
            "Appointment {} does not belong to {} {}",
            appointment.id, caller.role, caller.id
        )))
    }
}
