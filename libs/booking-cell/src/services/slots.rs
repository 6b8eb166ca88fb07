// libs/booking-cell/src/services/slots.rs
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use shared_models::auth::AuthSession;

use crate::models::{number_from, SlotAvailability, SlotSet, SlotState, MSG_NO_SLOTS};
use crate::services::cancellation::CancellationToken;
use crate::services::gateway::BookingBackend;

pub struct SlotReconciliationService {
    backend: Arc<dyn BookingBackend>,
}

impl SlotReconciliationService {
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self { backend }
    }

    /// Fetch slots for one (doctor, date) pair. Every call goes to the
    /// backend; another actor may have booked since the last look.
    ///
    /// Backend failures come back as an empty slot set rather than an error.
    /// `None` means the caller cancelled and the result must be dropped.
    pub async fn fetch(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth: &AuthSession,
        cancel: &CancellationToken,
    ) -> Option<SlotAvailability> {
        debug!("Reconciling slots for doctor {} on {}", doctor_id, date);

        let response = cancel
            .run(self.backend.fetch_availability(doctor_id, date, auth))
            .await?;

        let availability = match response {
            Ok(body) => {
                let fee = body
                    .doctor
                    .as_ref()
                    .and_then(|doctor| doctor.consultation_fee.as_ref())
                    .and_then(number_from);

                SlotAvailability {
                    doctor_id: doctor_id.to_string(),
                    date,
                    slots: SlotSet::new(body.all_slots, body.time_slots, body.booked_slots),
                    consultation_fee: fee,
                }
            }
            Err(e) => {
                warn!(
                    "Availability lookup failed for doctor {} on {}, showing no slots: {}",
                    doctor_id, date, e
                );
                SlotAvailability {
                    doctor_id: doctor_id.to_string(),
                    date,
                    slots: SlotSet::empty(),
                    consultation_fee: None,
                }
            }
        };

        if availability.slots.available.is_empty() {
            info!("No bookable slots for doctor {} on {}", doctor_id, date);
        }

        Some(availability)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub label: String,
    pub state: SlotState,
}

impl SlotView {
    pub fn is_selectable(&self) -> bool {
        self.state == SlotState::Selectable
    }

    /// Short annotation shown next to a disabled slot.
    pub fn annotation(&self) -> Option<&'static str> {
        match self.state {
            SlotState::Booked => Some("booked"),
            _ => None,
        }
    }
}

/// What the time picker shows for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotBoard {
    pub slots: Vec<SlotView>,
}

impl SlotBoard {
    /// Lists every label in `all`, then any label the backend reported as
    /// available or booked without listing it in `all`.
    pub fn render(slots: &SlotSet) -> Self {
        let mut labels: Vec<&String> = slots.all.iter().collect();
        for extra in slots.available.iter().chain(slots.booked.iter()) {
            if !labels.contains(&extra) {
                warn!("Slot {} missing from the doctor's full slot list", extra);
                labels.push(extra);
            }
        }

        Self {
            slots: labels
                .into_iter()
                .map(|label| SlotView {
                    label: label.clone(),
                    state: slots.state_of(label),
                })
                .collect(),
        }
    }

    pub fn selectable(&self) -> impl Iterator<Item = &SlotView> {
        self.slots.iter().filter(|slot| slot.is_selectable())
    }

    pub fn has_selectable(&self) -> bool {
        self.selectable().next().is_some()
    }

    /// Explicit message when there is nothing to list at all.
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.slots.is_empty() {
            Some(MSG_NO_SLOTS)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_board_marks_states() {
        let slots = SlotSet::new(
            labels(&["09:00", "09:30", "10:00"]),
            labels(&["09:00"]),
            labels(&["09:30"]),
        );
        let board = SlotBoard::render(&slots);

        let states: Vec<(&str, SlotState)> = board
            .slots
            .iter()
            .map(|slot| (slot.label.as_str(), slot.state))
            .collect();
        assert_eq!(
            states,
            vec![
                ("09:00", SlotState::Selectable),
                ("09:30", SlotState::Booked),
                ("10:00", SlotState::Unavailable),
            ]
        );
        assert_eq!(board.slots[1].annotation(), Some("booked"));
        assert_eq!(board.slots[2].annotation(), None);
        assert!(board.empty_message().is_none());
    }

    #[test]
    fn test_board_with_overlapping_fixture_never_offers_booked_slot() {
        let slots = SlotSet::new(
            labels(&["09:00", "09:30"]),
            labels(&["09:00", "09:30"]),
            labels(&["09:30"]),
        );
        let board = SlotBoard::render(&slots);

        let selectable: Vec<&str> = board.selectable().map(|s| s.label.as_str()).collect();
        assert_eq!(selectable, vec!["09:00"]);
        for slot in &board.slots {
            assert!(!(slot.is_selectable() && slots.booked.contains(&slot.label)));
        }
    }

    #[test]
    fn test_board_appends_labels_missing_from_all() {
        let slots = SlotSet::new(vec![], labels(&["11:00"]), labels(&["11:30"]));
        let board = SlotBoard::render(&slots);

        assert_eq!(board.slots.len(), 2);
        assert!(board.has_selectable());
    }

    #[test]
    fn test_empty_board_has_message() {
        let board = SlotBoard::render(&SlotSet::empty());
        assert_eq!(board.empty_message(), Some(MSG_NO_SLOTS));
        assert!(!board.has_selectable());
    }

    #[test]
    fn test_all_slots_disabled_when_nothing_available() {
        let slots = SlotSet::new(labels(&["09:00", "09:30"]), vec![], vec![]);
        let board = SlotBoard::render(&slots);

        assert!(!board.has_selectable());
        assert!(board.empty_message().is_none());
    }
}
