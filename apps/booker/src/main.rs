use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;

use args::{auth_from_env, card_from_env, BookingArgs};
use booking_cell::models::{BookingMode, BookingReceipt};
use booking_cell::services::{
    BookingPhase, BookingSession, HttpBookingBackend, PaymentDescriptor, SimulatedPaymentProcessor,
};
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,reqwest=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let booking = BookingArgs::parse(std::env::args().skip(1))?;

    let config = AppConfig::from_env();
    if !config.is_configured() {
        bail!("CLINIC_API_URL must be set");
    }

    let auth = auth_from_env()?;
    info!("Booking as {} ({})", auth.name, auth.role);

    let backend = Arc::new(HttpBookingBackend::new(&config));
    let processor = Arc::new(SimulatedPaymentProcessor::new(config.payment_delay()));

    let mut session = BookingSession::new(auth, backend, processor, &config)?.on_booked(Box::new(
        |receipt: &BookingReceipt| {
            info!(
                "Appointment {} booked for {} at {}",
                receipt.appointment.id,
                receipt
                    .appointment
                    .date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                receipt.appointment.time
            );
        },
    ));

    // `open` issues a fresh token, so take the handle afterwards.
    session.open();
    let cancel = session.cancellation_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning booking");
            cancel.cancel();
        }
    });

    session.load_directory().await?;

    if session.mode() == BookingMode::Receptionist {
        let patient_id = booking
            .patient_id
            .as_deref()
            .context("--patient is required when booking as receptionist")?;
        session.select_patient(patient_id)?;
    }

    session.select_doctor(&booking.doctor_id)?;
    session.select_date(booking.date).await?;

    if let Some(board) = session.slot_board() {
        if let Some(message) = board.empty_message() {
            bail!("{}", message);
        }
        for slot in &board.slots {
            match slot.annotation() {
                Some(note) => info!("  {} ({})", slot.label, note),
                None => info!("  {}", slot.label),
            }
        }
    }

    session.select_time(&booking.time)?;
    session.set_reason(&booking.reason)?;
    session.set_notes(&booking.notes)?;

    let receipt = match session.submit().await {
        Ok(receipt) => receipt,
        Err(first) => {
            if matches!(session.phase(), BookingPhase::PartiallyCommitted { .. }) {
                warn!("{}; retrying bill once", first);
                session.retry_bill().await?
            } else {
                return Err(first.into());
            }
        }
    };
    info!(
        "Bill of {:.2} created for appointment {}",
        receipt.bill.amount, receipt.appointment.id
    );

    let card = card_from_env()?;
    let cardholder = card
        .cardholder_name
        .unwrap_or_else(|| session.cardholder_name());
    let descriptor = PaymentDescriptor::card(&card.number, &card.expiry, &card.cvv, &cardholder);

    let confirmation = session.confirm_payment(&descriptor).await?;
    info!(
        "Payment {} of {:.2} confirmed",
        confirmation.transaction_id, confirmation.amount
    );

    Ok(())
}
