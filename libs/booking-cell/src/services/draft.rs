// libs/booking-cell/src/services/draft.rs
use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::models::{
    BookingCommand, BookingError, BookingMode, BookingStep, CreateAppointmentRequest,
    DoctorSummary, PatientSummary, SlotAvailability, MSG_MISSING_REASON,
};

/// In-progress booking selection. Never persisted; dropped when the dialog
/// closes or the booking is confirmed.
///
/// Earlier selections own later ones: a new doctor clears the date, slots
/// and time, and a new date clears the slots and time.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    mode: BookingMode,
    today: NaiveDate,
    window_days: i64,
    patient: Option<PatientSummary>,
    doctor: Option<DoctorSummary>,
    date: Option<NaiveDate>,
    availability: Option<SlotAvailability>,
    time: Option<String>,
    reason: String,
    notes: String,
}

impl BookingDraft {
    pub fn new(mode: BookingMode, today: NaiveDate, window_days: i64) -> Self {
        Self {
            mode,
            today,
            window_days: window_days.max(0),
            patient: None,
            doctor: None,
            date: None,
            availability: None,
            time: None,
            reason: String::new(),
            notes: String::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.mode, self.today, self.window_days);
    }

    pub fn mode(&self) -> BookingMode {
        self.mode
    }

    pub fn patient(&self) -> Option<&PatientSummary> {
        self.patient.as_ref()
    }

    pub fn doctor(&self) -> Option<&DoctorSummary> {
        self.doctor.as_ref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn availability(&self) -> Option<&SlotAvailability> {
        self.availability.as_ref()
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Inclusive range of bookable dates.
    pub fn booking_window(&self) -> (NaiveDate, NaiveDate) {
        (self.today, self.today + Duration::days(self.window_days))
    }

    pub fn select_patient(&mut self, patient: PatientSummary) -> Result<(), BookingError> {
        if self.mode != BookingMode::Receptionist {
            return Err(BookingError::InvalidState(
                "Patients book for themselves".to_string(),
            ));
        }

        debug!("Patient {} selected", patient.id);
        self.patient = Some(patient);
        Ok(())
    }

    pub fn select_doctor(&mut self, doctor: DoctorSummary) {
        debug!("Doctor {} selected, clearing date and slots", doctor.id);
        self.doctor = Some(doctor);
        self.date = None;
        self.availability = None;
        self.time = None;
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        if self.doctor.is_none() {
            return Err(BookingError::InvalidState("Select a doctor first".to_string()));
        }

        let (from, to) = self.booking_window();
        if date < from || date > to {
            return Err(BookingError::DateOutOfRange { date, from, to });
        }

        debug!("Date {} selected, clearing time", date);
        self.date = Some(date);
        self.availability = None;
        self.time = None;
        Ok(())
    }

    /// Attach fetched slots. Returns false and leaves the draft untouched
    /// when the doctor or date changed while the fetch was in flight.
    pub fn apply_availability(&mut self, availability: SlotAvailability) -> bool {
        let current_doctor = self.doctor.as_ref().map(|d| d.id.as_str());
        if current_doctor != Some(availability.doctor_id.as_str())
            || self.date != Some(availability.date)
        {
            debug!(
                "Discarding stale slots for doctor {} on {}",
                availability.doctor_id, availability.date
            );
            return false;
        }

        self.availability = Some(availability);
        self.time = None;
        true
    }

    pub fn select_time(&mut self, label: &str) -> Result<(), BookingError> {
        let availability = self.availability.as_ref().ok_or_else(|| {
            BookingError::InvalidState("Slots for this date are not loaded yet".to_string())
        })?;

        if !availability.slots.is_selectable(label) {
            return Err(BookingError::SlotUnavailable(label.to_string()));
        }

        self.time = Some(label.to_string());
        Ok(())
    }

    pub fn set_reason(&mut self, reason: &str) {
        self.reason = reason.to_string();
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
    }

    pub fn current_step(&self) -> BookingStep {
        if self.mode == BookingMode::Receptionist && self.patient.is_none() {
            BookingStep::SelectingPatient
        } else if self.doctor.is_none() {
            BookingStep::SelectingDoctor
        } else if self.date.is_none() {
            BookingStep::SelectingDate
        } else if self.availability.is_none() || self.time.is_none() {
            BookingStep::SelectingTime
        } else if self.reason.trim().is_empty() {
            BookingStep::EnteringDetails
        } else {
            BookingStep::ReadyToSubmit
        }
    }

    /// Whether the UI for `step` should be shown.
    pub fn is_unlocked(&self, step: BookingStep) -> bool {
        match step {
            BookingStep::SelectingPatient => self.mode == BookingMode::Receptionist,
            BookingStep::SelectingDoctor => {
                self.mode == BookingMode::Patient || self.patient.is_some()
            }
            BookingStep::SelectingDate => {
                self.is_unlocked(BookingStep::SelectingDoctor) && self.doctor.is_some()
            }
            BookingStep::SelectingTime => {
                self.is_unlocked(BookingStep::SelectingDate)
                    && self.date.is_some()
                    && self.availability.is_some()
            }
            BookingStep::EnteringDetails => {
                self.is_unlocked(BookingStep::SelectingTime) && self.time.is_some()
            }
            BookingStep::ReadyToSubmit => {
                self.is_unlocked(BookingStep::EnteringDetails) && !self.reason.trim().is_empty()
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.validate().is_ok()
    }

    /// Local checks run before any network call.
    pub fn validate(&self) -> Result<BookingCommand, BookingError> {
        let patient_ok = self.mode == BookingMode::Patient || self.patient.is_some();

        let (doctor, date, time) = match (&self.doctor, self.date, &self.time) {
            (Some(doctor), Some(date), Some(time)) if patient_ok => (doctor, date, time),
            _ => {
                return Err(BookingError::Validation(
                    self.mode.missing_fields_message().to_string(),
                ))
            }
        };

        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(BookingError::Validation(MSG_MISSING_REASON.to_string()));
        }

        let consultation_fee = self
            .availability
            .as_ref()
            .and_then(|a| a.consultation_fee)
            .or(doctor.consultation_fee)
            .unwrap_or_else(|| {
                warn!("No consultation fee known for doctor {}, billing 0", doctor.id);
                0.0
            });

        Ok(BookingCommand {
            mode: self.mode,
            appointment: CreateAppointmentRequest {
                doctor_id: doctor.id.clone(),
                date,
                time: time.clone(),
                reason: reason.to_string(),
                notes: self.notes.trim().to_string(),
                patient_id: match self.mode {
                    BookingMode::Receptionist => self.patient.as_ref().map(|p| p.id.clone()),
                    BookingMode::Patient => None,
                },
            },
            consultation_fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SlotSet, MSG_MISSING_PATIENT_FIELDS, MSG_MISSING_RECEPTIONIST_FIELDS};
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn doctor(id: &str, fee: Option<f64>) -> DoctorSummary {
        DoctorSummary {
            id: id.to_string(),
            name: format!("Dr. {}", id),
            specialization: None,
            qualification: None,
            experience_years: None,
            consultation_fee: fee,
        }
    }

    fn patient() -> PatientSummary {
        PatientSummary {
            id: "p1".to_string(),
            name: "Maria Lopez".to_string(),
            email: Some("maria@example.com".to_string()),
            contact_number: None,
        }
    }

    fn availability(doctor_id: &str, date: NaiveDate, fee: Option<f64>) -> SlotAvailability {
        SlotAvailability {
            doctor_id: doctor_id.to_string(),
            date,
            slots: SlotSet::new(
                vec!["09:00".to_string(), "09:30".to_string()],
                vec!["09:00".to_string()],
                vec!["09:30".to_string()],
            ),
            consultation_fee: fee,
        }
    }

    fn ready_draft(mode: BookingMode) -> BookingDraft {
        let mut draft = BookingDraft::new(mode, today(), 30);
        if mode == BookingMode::Receptionist {
            draft.select_patient(patient()).unwrap();
        }
        draft.select_doctor(doctor("A", Some(400.0)));
        draft.select_date(day(10)).unwrap();
        assert!(draft.apply_availability(availability("A", day(10), Some(500.0))));
        draft.select_time("09:00").unwrap();
        draft.set_reason("Checkup");
        draft
    }

    #[test]
    fn test_new_doctor_clears_dependent_state() {
        let mut draft = ready_draft(BookingMode::Patient);
        draft.select_doctor(doctor("B", None));

        assert_eq!(draft.doctor().map(|d| d.id.as_str()), Some("B"));
        assert!(draft.date().is_none());
        assert!(draft.availability().is_none());
        assert!(draft.time().is_none());
        assert_eq!(draft.current_step(), BookingStep::SelectingDate);
    }

    #[test]
    fn test_new_date_clears_time_but_keeps_doctor() {
        let mut draft = ready_draft(BookingMode::Patient);
        draft.select_date(day(11)).unwrap();

        assert_eq!(draft.doctor().map(|d| d.id.as_str()), Some("A"));
        assert_eq!(draft.date(), Some(day(11)));
        assert!(draft.time().is_none());
        assert!(draft.availability().is_none());
    }

    #[test]
    fn test_date_window_is_inclusive() {
        let mut draft = BookingDraft::new(BookingMode::Patient, today(), 30);
        draft.select_doctor(doctor("A", None));

        assert!(draft.select_date(today()).is_ok());
        assert!(draft.select_date(today() + Duration::days(30)).is_ok());
        assert_matches!(
            draft.select_date(today() + Duration::days(31)),
            Err(BookingError::DateOutOfRange { .. })
        );
        assert_matches!(
            draft.select_date(today() - Duration::days(1)),
            Err(BookingError::DateOutOfRange { .. })
        );
    }

    #[test]
    fn test_date_requires_doctor() {
        let mut draft = BookingDraft::new(BookingMode::Patient, today(), 30);
        assert_matches!(draft.select_date(day(10)), Err(BookingError::InvalidState(_)));
    }

    #[test]
    fn test_booked_slot_cannot_be_selected() {
        let mut draft = ready_draft(BookingMode::Patient);
        assert_eq!(
            draft.select_time("09:30"),
            Err(BookingError::SlotUnavailable("09:30".to_string()))
        );
        assert_eq!(
            draft.select_time("17:00"),
            Err(BookingError::SlotUnavailable("17:00".to_string()))
        );
        assert_eq!(draft.time(), Some("09:00"));
    }

    #[test]
    fn test_stale_availability_is_ignored() {
        let mut draft = BookingDraft::new(BookingMode::Patient, today(), 30);
        draft.select_doctor(doctor("A", None));
        draft.select_date(day(10)).unwrap();

        assert!(!draft.apply_availability(availability("B", day(10), None)));
        assert!(!draft.apply_availability(availability("A", day(12), None)));
        assert!(draft.availability().is_none());
    }

    #[test]
    fn test_steps_unlock_in_order() {
        let mut draft = BookingDraft::new(BookingMode::Receptionist, today(), 30);
        assert_eq!(draft.current_step(), BookingStep::SelectingPatient);
        assert!(!draft.is_unlocked(BookingStep::SelectingDoctor));

        draft.select_patient(patient()).unwrap();
        assert_eq!(draft.current_step(), BookingStep::SelectingDoctor);
        assert!(!draft.is_unlocked(BookingStep::SelectingDate));

        draft.select_doctor(doctor("A", None));
        assert_eq!(draft.current_step(), BookingStep::SelectingDate);

        draft.select_date(day(10)).unwrap();
        assert_eq!(draft.current_step(), BookingStep::SelectingTime);
        assert!(!draft.is_unlocked(BookingStep::SelectingTime));

        draft.apply_availability(availability("A", day(10), None));
        assert!(draft.is_unlocked(BookingStep::SelectingTime));

        draft.select_time("09:00").unwrap();
        assert_eq!(draft.current_step(), BookingStep::EnteringDetails);

        draft.set_reason("   ");
        assert!(!draft.is_unlocked(BookingStep::ReadyToSubmit));

        draft.set_reason("Follow-up");
        assert_eq!(draft.current_step(), BookingStep::ReadyToSubmit);
        assert!(draft.is_ready());
    }

    #[test]
    fn test_patient_mode_skips_patient_step() {
        let draft = BookingDraft::new(BookingMode::Patient, today(), 30);
        assert_eq!(draft.current_step(), BookingStep::SelectingDoctor);
        assert!(!draft.is_unlocked(BookingStep::SelectingPatient));
    }

    #[test]
    fn test_patient_mode_rejects_patient_selection() {
        let mut draft = BookingDraft::new(BookingMode::Patient, today(), 30);
        assert_matches!(draft.select_patient(patient()), Err(BookingError::InvalidState(_)));
    }

    #[test]
    fn test_validation_messages_for_missing_fields() {
        for mode in [BookingMode::Patient, BookingMode::Receptionist] {
            let expected = match mode {
                BookingMode::Patient => MSG_MISSING_PATIENT_FIELDS,
                BookingMode::Receptionist => MSG_MISSING_RECEPTIONIST_FIELDS,
            };

            // Each of patient/doctor/date/time missing in turn, with and without a reason.
            for missing in 0..4 {
                for reason in ["", "Checkup"] {
                    let mut draft = BookingDraft::new(mode, today(), 30);
                    if mode == BookingMode::Receptionist && missing != 0 {
                        draft.select_patient(patient()).unwrap();
                    }
                    if missing != 1 {
                        draft.select_doctor(doctor("A", Some(500.0)));
                        if missing != 2 {
                            draft.select_date(day(10)).unwrap();
                            draft.apply_availability(availability("A", day(10), None));
                            if missing != 3 {
                                draft.select_time("09:00").unwrap();
                            }
                        }
                    }
                    draft.set_reason(reason);

                    let patient_only_gap = missing == 0 && mode == BookingMode::Patient;
                    let result = draft.validate();
                    if patient_only_gap {
                        if reason.is_empty() {
                            assert_eq!(result, Err(BookingError::Validation(MSG_MISSING_REASON.to_string())));
                        } else {
                            assert!(result.is_ok());
                        }
                    } else {
                        assert_eq!(result, Err(BookingError::Validation(expected.to_string())));
                    }
                }
            }
        }
    }

    #[test]
    fn test_blank_reason_rejected_when_fields_set() {
        let mut draft = ready_draft(BookingMode::Receptionist);
        draft.set_reason(" \t ");
        assert_eq!(
            draft.validate(),
            Err(BookingError::Validation(MSG_MISSING_REASON.to_string()))
        );
    }

    #[test]
    fn test_command_uses_slot_fee_and_patient() {
        let mut draft = ready_draft(BookingMode::Receptionist);
        draft.set_reason("  Checkup ");
        let command = draft.validate().unwrap();

        assert_eq!(command.consultation_fee, 500.0);
        assert_eq!(command.appointment.reason, "Checkup");
        assert_eq!(command.appointment.notes, "");
        assert_eq!(command.appointment.patient_id.as_deref(), Some("p1"));

        let bill = command.bill_request("a1");
        assert_eq!(bill.amount, 500.0);
        assert_eq!(bill.patient_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_fee_falls_back_to_doctor() {
        let mut draft = BookingDraft::new(BookingMode::Patient, today(), 30);
        draft.select_doctor(doctor("A", Some(400.0)));
        draft.select_date(day(10)).unwrap();
        draft.apply_availability(availability("A", day(10), None));
        draft.select_time("09:00").unwrap();
        draft.set_reason("Checkup");

        let command = draft.validate().unwrap();
        assert_eq!(command.consultation_fee, 400.0);
        assert!(command.appointment.patient_id.is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut draft = ready_draft(BookingMode::Receptionist);
        draft.set_notes("bring reports");
        draft.reset();

        assert_eq!(draft, BookingDraft::new(BookingMode::Receptionist, today(), 30));
    }
}
