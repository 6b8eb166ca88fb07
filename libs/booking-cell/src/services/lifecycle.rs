// libs/booking-cell/src/services/lifecycle.rs
use std::sync::Arc;
use tracing::{debug, info, warn};

use shared_models::auth::AuthSession;

use crate::models::{Appointment, AppointmentStatus, BookingError, CancelAppointmentRequest};
use crate::services::gateway::BookingBackend;

pub struct AppointmentLifecycleService {
    backend: Arc<dyn BookingBackend>,
}

impl AppointmentLifecycleService {
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self { backend }
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), BookingError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !Self::get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(BookingError::InvalidStatusTransition(current_status));
        }

        Ok(())
    }

    pub fn get_valid_transitions(current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Booked => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Cancel a booked appointment. Returns the appointment with its new status.
    pub async fn cancel_appointment(
        &self,
        appointment: &Appointment,
        reason: &str,
        auth: &AuthSession,
    ) -> Result<Appointment, BookingError> {
        Self::validate_status_transition(appointment.status, AppointmentStatus::Cancelled)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(BookingError::Validation(
                "Please provide a reason for cancelling.".to_string(),
            ));
        }

        let request = CancelAppointmentRequest {
            reason: reason.to_string(),
        };

        self.backend
            .cancel_appointment(&appointment.id, &request, auth)
            .await
            .map_err(|e| BookingError::Backend(e.user_message("Failed to cancel appointment.")))?;

        info!("Appointment {} cancelled", appointment.id);

        let mut cancelled = appointment.clone();
        cancelled.status = AppointmentStatus::Cancelled;
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booked_can_complete_or_cancel() {
        assert!(AppointmentLifecycleService::validate_status_transition(
            AppointmentStatus::Booked,
            AppointmentStatus::Cancelled
        )
        .is_ok());
        assert!(AppointmentLifecycleService::validate_status_transition(
            AppointmentStatus::Booked,
            AppointmentStatus::Completed
        )
        .is_ok());
    }

    #[test]
    fn test_terminal_states_refuse_changes() {
        for terminal in [AppointmentStatus::Completed, AppointmentStatus::Cancelled] {
            assert_eq!(
                AppointmentLifecycleService::validate_status_transition(
                    terminal,
                    AppointmentStatus::Booked
                ),
                Err(BookingError::InvalidStatusTransition(terminal))
            );
            assert!(AppointmentLifecycleService::get_valid_transitions(terminal).is_empty());
        }
    }
}
