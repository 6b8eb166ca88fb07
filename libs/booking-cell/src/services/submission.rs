// libs/booking-cell/src/services/submission.rs
use std::sync::Arc;
use tracing::{error, info, warn};

use shared_models::auth::AuthSession;

use crate::models::{
    Appointment, Bill, BookingCommand, BookingError, BookingReceipt, MSG_APPOINTMENT_FAILED,
};
use crate::services::cancellation::CancellationToken;
use crate::services::gateway::BookingBackend;

/// Commits a validated draft as an appointment followed by its bill.
///
/// The two calls are strictly sequential. A failed appointment means no bill
/// is attempted. Once the appointment exists, a failed or cancelled bill is
/// reported as `BookingError::BillCreation` carrying it. Nothing is retried here.
pub struct BookingSubmissionService {
    backend: Arc<dyn BookingBackend>,
}

impl BookingSubmissionService {
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self { backend }
    }

    pub async fn submit(
        &self,
        command: &BookingCommand,
        auth: &AuthSession,
        cancel: &CancellationToken,
    ) -> Result<BookingReceipt, BookingError> {
        info!(
            "Booking appointment with doctor {} on {} at {}",
            command.appointment.doctor_id, command.appointment.date, command.appointment.time
        );

        let created = cancel
            .run(
                self.backend
                    .create_appointment(command.mode, &command.appointment, auth),
            )
            .await
            .ok_or(BookingError::Cancelled)?;

        let appointment = match created {
            Ok(appointment) => appointment,
            Err(e) => {
                error!("Appointment creation failed: {}", e);
                return Err(BookingError::AppointmentCreation(
                    e.user_message(MSG_APPOINTMENT_FAILED),
                ));
            }
        };

        info!("Appointment {} created, creating bill", appointment.id);

        let bill = self.create_bill(command, &appointment, auth, cancel).await?;

        Ok(BookingReceipt { appointment, bill })
    }

    /// Second phase on its own, used both by `submit` and by an explicit
    /// retry after a partial commit.
    pub async fn create_bill(
        &self,
        command: &BookingCommand,
        appointment: &Appointment,
        auth: &AuthSession,
        cancel: &CancellationToken,
    ) -> Result<Bill, BookingError> {
        let request = command.bill_request(&appointment.id);

        let created = match cancel
            .run(self.backend.create_bill(command.mode, &request, auth))
            .await
        {
            Some(result) => result,
            // The appointment already exists, so this is still a partial commit.
            None => {
                warn!(
                    "Bill creation for appointment {} cancelled after the appointment was created",
                    appointment.id
                );
                return Err(BookingError::BillCreation {
                    appointment: Box::new(appointment.clone()),
                    reason: "cancelled before the bill was created".to_string(),
                });
            }
        };

        match created {
            Ok(bill) => {
                info!(
                    "Bill created for appointment {} ({:.2})",
                    appointment.id, bill.amount
                );
                Ok(bill)
            }
            Err(e) => {
                warn!(
                    "Appointment {} booked but bill creation failed: {}",
                    appointment.id, e
                );
                Err(BookingError::BillCreation {
                    appointment: Box::new(appointment.clone()),
                    reason: e.to_string(),
                })
            }
        }
    }
}
