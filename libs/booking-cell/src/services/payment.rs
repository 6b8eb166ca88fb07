// libs/booking-cell/src/services/payment.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Bill, BookingError, MSG_PAYMENT_FAILED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
}

/// Card details as entered. The full number and CVV never leave this struct
/// through `Debug` or serialization.
#[derive(Clone, Serialize)]
pub struct CardDetails {
    pub masked_number: String,
    pub expiry: String,
    #[serde(skip)]
    cvv: String,
    pub cardholder_name: String,
}

impl CardDetails {
    pub fn has_cvv(&self) -> bool {
        !self.cvv.is_empty()
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("masked_number", &self.masked_number)
            .field("expiry", &self.expiry)
            .field("cardholder_name", &self.cardholder_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentDescriptor {
    pub method: PaymentMethod,
    pub card: CardDetails,
}

impl PaymentDescriptor {
    pub fn card(number: &str, expiry: &str, cvv: &str, cardholder_name: &str) -> Self {
        Self {
            method: PaymentMethod::Card,
            card: CardDetails {
                masked_number: mask_card_number(number),
                expiry: expiry.trim().to_string(),
                cvv: cvv.trim().to_string(),
                cardholder_name: cardholder_name.trim().to_string(),
            },
        }
    }
}

/// Keeps the last four digits: `**** **** **** 4242`.
pub fn mask_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("**** **** **** {}", tail)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentConfirmation {
    pub transaction_id: Uuid,
    pub amount: f64,
    pub appointment_id: String,
    pub processed_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn process(
        &self,
        descriptor: &PaymentDescriptor,
        bill: &Bill,
    ) -> Result<PaymentConfirmation, BookingError>;
}

/// Stand-in gateway: waits, then confirms. No money moves.
pub struct SimulatedPaymentProcessor {
    delay: Duration,
    decline: bool,
}

impl SimulatedPaymentProcessor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            decline: false,
        }
    }

    /// A processor that declines every payment.
    pub fn declining(delay: Duration) -> Self {
        Self {
            delay,
            decline: true,
        }
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedPaymentProcessor {
    async fn process(
        &self,
        descriptor: &PaymentDescriptor,
        bill: &Bill,
    ) -> Result<PaymentConfirmation, BookingError> {
        debug!(
            "Simulating {:?} payment of {:.2} for appointment {} with card {}",
            descriptor.method, bill.amount, bill.appointment_id, descriptor.card.masked_number
        );

        tokio::time::sleep(self.delay).await;

        if self.decline {
            warn!("Simulated payment declined for appointment {}", bill.appointment_id);
            return Err(BookingError::Payment(MSG_PAYMENT_FAILED.to_string()));
        }

        let confirmation = PaymentConfirmation {
            transaction_id: Uuid::new_v4(),
            amount: bill.amount,
            appointment_id: bill.appointment_id.clone(),
            processed_at: Utc::now(),
        };

        info!(
            "Simulated payment {} confirmed for appointment {}",
            confirmation.transaction_id, bill.appointment_id
        );
        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;

    fn bill() -> Bill {
        Bill {
            id: Some("b1".to_string()),
            appointment_id: "a1".to_string(),
            doctor_id: "d1".to_string(),
            patient_id: None,
            amount: 500.0,
            payment_status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn test_card_number_is_masked() {
        assert_eq!(mask_card_number("4242 4242 4242 4242"), "**** **** **** 4242");
        assert_eq!(mask_card_number("12"), "**** **** **** 12");
    }

    #[test]
    fn test_descriptor_hides_cvv() {
        let descriptor = PaymentDescriptor::card("4111111111111111", "12/27", "123", "Maria Lopez");
        let printed = format!("{:?}", descriptor);
        let json = serde_json::to_string(&descriptor).unwrap();

        assert!(descriptor.card.has_cvv());
        assert!(!printed.contains("123"));
        assert!(!json.contains("\"cvv\""));
        assert!(!json.contains("4111111111111111"));
    }

    #[tokio::test]
    async fn test_simulated_payment_confirms() {
        let processor = SimulatedPaymentProcessor::new(Duration::from_millis(1));
        let descriptor = PaymentDescriptor::card("4242424242424242", "01/30", "999", "Jane Roe");

        let confirmation = processor.process(&descriptor, &bill()).await.unwrap();
        assert_eq!(confirmation.amount, 500.0);
        assert_eq!(confirmation.appointment_id, "a1");
    }

    #[tokio::test]
    async fn test_declining_processor_fails_with_message() {
        let processor = SimulatedPaymentProcessor::declining(Duration::ZERO);
        let descriptor = PaymentDescriptor::card("4242424242424242", "01/30", "999", "Jane Roe");

        let err = processor.process(&descriptor, &bill()).await.unwrap_err();
        assert_eq!(err.to_string(), MSG_PAYMENT_FAILED);
    }
}
