// libs/booking-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use shared_models::auth::Role;

pub const MSG_MISSING_RECEPTIONIST_FIELDS: &str = "Please select patient, doctor, date, and time.";
pub const MSG_MISSING_PATIENT_FIELDS: &str = "Please select doctor, date, and time.";
pub const MSG_MISSING_REASON: &str = "Please provide a reason for the appointment.";
pub const MSG_APPOINTMENT_FAILED: &str = "Failed to book appointment.";
pub const MSG_BILL_FAILED: &str = "Appointment booked but failed to create bill";
pub const MSG_PAYMENT_FAILED: &str = "Payment failed. Please try again.";
pub const MSG_NO_SLOTS: &str = "No available slots for this date";

// ==============================================================================
// DIRECTORY MODELS
// ==============================================================================

/// Canonical doctor shape used everywhere past the backend boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: String,
    pub name: String,
    pub specialization: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: Option<u32>,
    pub consultation_fee: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub contact_number: Option<String>,
}

impl PatientSummary {
    /// Case-insensitive substring match over name and email.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&needle)
            || self
                .email
                .as_deref()
                .map(|email| email.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "phone")]
    pub contact_number: Option<String>,
}

/// Doctor as the backend sends it. Depending on the endpoint the identity
/// and name live at the top level, under `user`, or under a `doctor` wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRecord {
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub user: Option<UserRecord>,
    pub doctor: Option<Box<DoctorRecord>>,
    #[serde(alias = "specialty")]
    pub specialization: Option<String>,
    pub qualification: Option<String>,
    #[serde(alias = "yearsOfExperience")]
    pub experience: Option<Value>,
    #[serde(alias = "fee")]
    pub consultation_fee: Option<Value>,
}

impl DoctorRecord {
    fn own_id(&self) -> Option<String> {
        non_empty(self.mongo_id.as_deref()).or_else(|| non_empty(self.id.as_deref()))
    }

    fn own_name(&self) -> Option<String> {
        non_empty(self.name.as_deref())
            .or_else(|| self.user.as_ref().and_then(|u| non_empty(u.name.as_deref())))
    }

    /// Collapse the wire record into a `DoctorSummary`. Records without any
    /// identifier cannot be booked against and yield `None`.
    pub fn normalize(self) -> Option<DoctorSummary> {
        let inner = self.doctor.as_deref();

        let id = self.own_id().or_else(|| inner.and_then(DoctorRecord::own_id))?;
        let name = self
            .own_name()
            .or_else(|| inner.and_then(DoctorRecord::own_name))
            .unwrap_or_else(|| "Unknown doctor".to_string());

        Some(DoctorSummary {
            id,
            name,
            specialization: self
                .specialization
                .clone()
                .or_else(|| inner.and_then(|d| d.specialization.clone())),
            qualification: self
                .qualification
                .clone()
                .or_else(|| inner.and_then(|d| d.qualification.clone())),
            experience_years: self
                .experience
                .as_ref()
                .and_then(number_from)
                .or_else(|| inner.and_then(|d| d.experience.as_ref().and_then(number_from)))
                .map(|years| years.max(0.0) as u32),
            consultation_fee: self
                .consultation_fee
                .as_ref()
                .and_then(number_from)
                .or_else(|| inner.and_then(|d| d.consultation_fee.as_ref().and_then(number_from))),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "phone")]
    pub contact_number: Option<String>,
    pub user: Option<UserRecord>,
}

impl PatientRecord {
    pub fn normalize(self) -> Option<PatientSummary> {
        let id = non_empty(self.mongo_id.as_deref()).or_else(|| non_empty(self.id.as_deref()))?;
        let user = self.user.unwrap_or_default();

        Some(PatientSummary {
            id,
            name: non_empty(self.name.as_deref())
                .or_else(|| non_empty(user.name.as_deref()))
                .unwrap_or_else(|| "Unknown patient".to_string()),
            email: non_empty(self.email.as_deref()).or_else(|| non_empty(user.email.as_deref())),
            contact_number: non_empty(self.contact_number.as_deref())
                .or_else(|| non_empty(user.contact_number.as_deref())),
        })
    }
}

/// A reference that arrives either as a bare id or as a populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl EntityRef {
    pub fn id(&self) -> &str {
        match self {
            EntityRef::Id(id) => id,
            EntityRef::Populated { id, .. } => id,
        }
    }
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

/// Three views of one doctor's day. `available` and `booked` never overlap
/// once constructed through `SlotSet::new`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSet {
    pub all: Vec<String>,
    pub available: Vec<String>,
    pub booked: Vec<String>,
}

impl SlotSet {
    pub fn new(all: Vec<String>, available: Vec<String>, booked: Vec<String>) -> Self {
        let booked = dedupe(booked);
        let booked_set: HashSet<&str> = booked.iter().map(String::as_str).collect();

        let (available, conflicting): (Vec<String>, Vec<String>) = dedupe(available)
            .into_iter()
            .partition(|label| !booked_set.contains(label.as_str()));

        if !conflicting.is_empty() {
            tracing::warn!(
                "Slots reported both available and booked, treating as booked: {:?}",
                conflicting
            );
        }

        Self {
            all: dedupe(all),
            available,
            booked,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.available.is_empty() && self.booked.is_empty()
    }

    pub fn state_of(&self, label: &str) -> SlotState {
        if self.available.iter().any(|slot| slot == label) {
            SlotState::Selectable
        } else if self.booked.iter().any(|slot| slot == label) {
            SlotState::Booked
        } else {
            SlotState::Unavailable
        }
    }

    pub fn is_selectable(&self, label: &str) -> bool {
        self.state_of(label) == SlotState::Selectable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Selectable,
    Booked,
    Unavailable,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotState::Selectable => write!(f, "selectable"),
            SlotState::Booked => write!(f, "booked"),
            SlotState::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Reconciled slot data for one (doctor, date) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub slots: SlotSet,
    pub consultation_fee: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time_slots: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub booked_slots: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub all_slots: Vec<String>,
    pub doctor: Option<DoctorRecord>,
}

// ==============================================================================
// BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingMode {
    Patient,
    Receptionist,
}

impl BookingMode {
    pub fn for_role(role: Role) -> Result<Self, BookingError> {
        match role {
            Role::Patient => Ok(BookingMode::Patient),
            Role::Receptionist | Role::Admin => Ok(BookingMode::Receptionist),
            Role::Doctor => Err(BookingError::Unauthorized(role)),
        }
    }

    pub fn missing_fields_message(&self) -> &'static str {
        match self {
            BookingMode::Patient => MSG_MISSING_PATIENT_FIELDS,
            BookingMode::Receptionist => MSG_MISSING_RECEPTIONIST_FIELDS,
        }
    }
}

/// Form steps in unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    SelectingPatient,
    SelectingDoctor,
    SelectingDate,
    SelectingTime,
    EnteringDetails,
    ReadyToSubmit,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStep::SelectingPatient => write!(f, "selecting_patient"),
            BookingStep::SelectingDoctor => write!(f, "selecting_doctor"),
            BookingStep::SelectingDate => write!(f, "selecting_date"),
            BookingStep::SelectingTime => write!(f, "selecting_time"),
            BookingStep::EnteringDetails => write!(f, "entering_details"),
            BookingStep::ReadyToSubmit => write!(f, "ready_to_submit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    pub appointment_id: String,
    pub doctor_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: String,
}

/// A validated draft, ready for the two network calls.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingCommand {
    pub mode: BookingMode,
    pub appointment: CreateAppointmentRequest,
    pub consultation_fee: f64,
}

impl BookingCommand {
    pub fn bill_request(&self, appointment_id: &str) -> CreateBillRequest {
        CreateBillRequest {
            appointment_id: appointment_id.to_string(),
            doctor_id: self.appointment.doctor_id.clone(),
            amount: self.consultation_fee,
            patient_id: self.appointment.patient_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Booked,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Lenient parse; statuses this client does not model count as booked.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" => AppointmentStatus::Completed,
            "cancelled" | "canceled" => AppointmentStatus::Cancelled,
            "booked" | "scheduled" => AppointmentStatus::Booked,
            other => {
                tracing::warn!("Unknown appointment status '{}', treating as booked", other);
                AppointmentStatus::Booked
            }
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub id: String,
    pub doctor: EntityRef,
    pub patient: Option<EntityRef>,
    pub date: Option<NaiveDate>,
    pub time: String,
    pub reason: String,
    pub notes: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub id: Option<String>,
    pub doctor: Option<EntityRef>,
    pub patient: Option<EntityRef>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

impl AppointmentRecord {
    /// Fill whatever the backend left out from the request that created it.
    pub fn into_appointment(self, request: &CreateAppointmentRequest) -> Option<Appointment> {
        let id = non_empty(self.mongo_id.as_deref()).or_else(|| non_empty(self.id.as_deref()))?;

        Some(Appointment {
            id,
            doctor: self
                .doctor
                .unwrap_or_else(|| EntityRef::Id(request.doctor_id.clone())),
            patient: self
                .patient
                .or_else(|| request.patient_id.clone().map(EntityRef::Id)),
            date: self
                .date
                .as_deref()
                .and_then(parse_leading_date)
                .or(Some(request.date)),
            time: self.time.unwrap_or_else(|| request.time.clone()),
            reason: self.reason.unwrap_or_else(|| request.reason.clone()),
            notes: self.notes.unwrap_or_else(|| request.notes.clone()),
            status: self
                .status
                .as_deref()
                .map(AppointmentStatus::from_wire)
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" => PaymentStatus::Paid,
            "overdue" => PaymentStatus::Overdue,
            _ => PaymentStatus::Pending,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Overdue => write!(f, "overdue"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bill {
    pub id: Option<String>,
    pub appointment_id: String,
    pub doctor_id: String,
    pub patient_id: Option<String>,
    pub amount: f64,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub id: Option<String>,
    pub amount: Option<Value>,
    pub payment_status: Option<String>,
}

impl BillRecord {
    pub fn into_bill(self, request: &CreateBillRequest) -> Bill {
        Bill {
            id: non_empty(self.mongo_id.as_deref()).or_else(|| non_empty(self.id.as_deref())),
            appointment_id: request.appointment_id.clone(),
            doctor_id: request.doctor_id.clone(),
            patient_id: request.patient_id.clone(),
            amount: self
                .amount
                .as_ref()
                .and_then(number_from)
                .unwrap_or(request.amount),
            payment_status: self
                .payment_status
                .as_deref()
                .map(PaymentStatus::from_wire)
                .unwrap_or_default(),
        }
    }
}

/// Both halves of a committed booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingReceipt {
    pub appointment: Appointment,
    pub bill: Bill,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("Selected time {0} is not available")]
    SlotUnavailable(String),

    #[error("Date {date} is outside the bookable range {from} to {to}")]
    DateOutOfRange {
        date: NaiveDate,
        from: NaiveDate,
        to: NaiveDate,
    },

    #[error("{0}")]
    AppointmentCreation(String),

    #[error("Appointment booked but failed to create bill")]
    BillCreation {
        appointment: Box<Appointment>,
        reason: String,
    },

    #[error("{0}")]
    Payment(String),

    #[error("Role {0} cannot book appointments")]
    Unauthorized(Role),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Operation cancelled")]
    Cancelled,
}

// ==============================================================================
// HELPERS
// ==============================================================================

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts `500`, `500.0` or `"500"`. Negative and non-finite values are
/// rejected so they never reach a bill.
pub(crate) fn number_from(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    if number.is_finite() && number >= 0.0 {
        Some(number)
    } else {
        tracing::warn!("Ignoring invalid numeric value {}", value);
        None
    }
}

/// A slot list sent as `null` reads as empty instead of failing the response.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn parse_leading_date(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

fn dedupe(labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty() && seen.insert(label.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_slot_set_removes_overlap() {
        let slots = SlotSet::new(
            labels(&["09:00", "09:30", "10:00"]),
            labels(&["09:00", "09:30"]),
            labels(&["09:30"]),
        );

        assert_eq!(slots.available, labels(&["09:00"]));
        assert_eq!(slots.state_of("09:30"), SlotState::Booked);
        assert_eq!(slots.state_of("10:00"), SlotState::Unavailable);
        assert!(slots.is_selectable("09:00"));
    }

    #[test]
    fn test_availability_null_slot_list_reads_as_empty() {
        let response: AvailabilityResponse = serde_json::from_value(json!({
            "success": true,
            "allSlots": ["09:00", "09:30"],
            "timeSlots": ["09:00", "09:30"],
            "bookedSlots": null
        }))
        .unwrap();

        assert!(response.booked_slots.is_empty());
        let slots = SlotSet::new(response.all_slots, response.time_slots, response.booked_slots);
        assert!(slots.is_selectable("09:00"));
        assert!(slots.is_selectable("09:30"));
    }

    #[test]
    fn test_number_from_rejects_invalid_amounts() {
        assert_eq!(number_from(&json!("250.5")), Some(250.5));
        assert_eq!(number_from(&json!(0)), Some(0.0));
        assert_eq!(number_from(&json!("NaN")), None);
        assert_eq!(number_from(&json!("inf")), None);
        assert_eq!(number_from(&json!(-40)), None);
        assert_eq!(number_from(&json!("-40")), None);
    }

    #[test]
    fn test_doctor_normalization_reads_nested_user() {
        let record: DoctorRecord = serde_json::from_value(json!({
            "_id": "d1",
            "user": { "name": "Dr. A", "email": "a@clinic.test" },
            "specialization": "Cardiology",
            "experience": "12",
            "consultationFee": 500
        }))
        .unwrap();

        let doctor = record.normalize().unwrap();
        assert_eq!(doctor.id, "d1");
        assert_eq!(doctor.name, "Dr. A");
        assert_eq!(doctor.experience_years, Some(12));
        assert_eq!(doctor.consultation_fee, Some(500.0));
    }

    #[test]
    fn test_doctor_normalization_reads_wrapper() {
        let record: DoctorRecord = serde_json::from_value(json!({
            "doctor": { "id": "d2", "name": "Dr. B", "fee": "350.5", "specialty": "ENT" }
        }))
        .unwrap();

        let doctor = record.normalize().unwrap();
        assert_eq!(doctor.id, "d2");
        assert_eq!(doctor.name, "Dr. B");
        assert_eq!(doctor.specialization.as_deref(), Some("ENT"));
        assert_eq!(doctor.consultation_fee, Some(350.5));
    }

    #[test]
    fn test_doctor_without_id_is_dropped() {
        let record: DoctorRecord = serde_json::from_value(json!({ "name": "Dr. Nobody" })).unwrap();
        assert!(record.normalize().is_none());
    }

    #[test]
    fn test_patient_matching() {
        let patient = PatientSummary {
            id: "p1".to_string(),
            name: "Maria Lopez".to_string(),
            email: Some("MLopez@Example.com".to_string()),
            contact_number: None,
        };

        assert!(patient.matches("maria"));
        assert!(patient.matches("example.COM"));
        assert!(patient.matches("  "));
        assert!(!patient.matches("john"));
    }

    #[test]
    fn test_appointment_record_fills_from_request() {
        let request = CreateAppointmentRequest {
            doctor_id: "d1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            time: "09:00".to_string(),
            reason: "Checkup".to_string(),
            notes: String::new(),
            patient_id: None,
        };
        let record: AppointmentRecord = serde_json::from_value(json!({
            "_id": "a1",
            "doctor": { "_id": "d1", "name": "Dr. A" },
            "date": "2025-06-10T00:00:00.000Z"
        }))
        .unwrap();

        let appointment = record.into_appointment(&request).unwrap();
        assert_eq!(appointment.id, "a1");
        assert_eq!(appointment.doctor.id(), "d1");
        assert_eq!(appointment.date, Some(request.date));
        assert_eq!(appointment.time, "09:00");
        assert_eq!(appointment.status, AppointmentStatus::Booked);
    }

    #[test]
    fn test_bill_error_message_is_exact() {
        let err = BookingError::BillCreation {
            appointment: Box::new(Appointment {
                id: "a1".to_string(),
                doctor: EntityRef::Id("d1".to_string()),
                patient: None,
                date: None,
                time: "09:00".to_string(),
                reason: "Checkup".to_string(),
                notes: String::new(),
                status: AppointmentStatus::Booked,
            }),
            reason: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), MSG_BILL_FAILED);
    }
}
