// libs/booking-cell/src/services/gateway.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_http::ApiClient;
use shared_models::{auth::AuthSession, error::AppError};

use crate::models::{
    Appointment, AppointmentRecord, AvailabilityResponse, Bill, BillRecord, BookingMode,
    CancelAppointmentRequest, CreateAppointmentRequest, CreateBillRequest, DoctorRecord,
    PatientRecord,
};

/// Everything the booking workflow needs from the clinic backend.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn fetch_availability(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth: &AuthSession,
    ) -> Result<AvailabilityResponse, AppError>;

    async fn list_doctors(
        &self,
        mode: BookingMode,
        auth: &AuthSession,
    ) -> Result<Vec<DoctorRecord>, AppError>;

    async fn list_patients(&self, auth: &AuthSession) -> Result<Vec<PatientRecord>, AppError>;

    async fn create_appointment(
        &self,
        mode: BookingMode,
        request: &CreateAppointmentRequest,
        auth: &AuthSession,
    ) -> Result<Appointment, AppError>;

    async fn create_bill(
        &self,
        mode: BookingMode,
        request: &CreateBillRequest,
        auth: &AuthSession,
    ) -> Result<Bill, AppError>;

    async fn cancel_appointment(
        &self,
        appointment_id: &str,
        request: &CancelAppointmentRequest,
        auth: &AuthSession,
    ) -> Result<(), AppError>;
}

pub struct HttpBookingBackend {
    api: ApiClient,
}

impl HttpBookingBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    pub fn with_client(api: ApiClient) -> Self {
        Self { api }
    }

    fn appointments_path(mode: BookingMode) -> &'static str {
        match mode {
            BookingMode::Patient => "/api/appointments",
            BookingMode::Receptionist => "/api/receptionist/appointments",
        }
    }

    fn bills_path(mode: BookingMode) -> &'static str {
        match mode {
            BookingMode::Patient => "/api/bills",
            BookingMode::Receptionist => "/api/receptionist/bills",
        }
    }
}

/// A 2xx body can still carry `success: false`.
fn ensure_success(body: &Value) -> Result<(), AppError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        warn!("Backend reported failure: {}", body);
        return Err(AppError::rejected(None, body));
    }
    Ok(())
}

/// Pull `key` out of an envelope, or treat the whole body as the payload.
fn payload(body: Value, key: &str) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| AppError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
    async fn fetch_availability(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth: &AuthSession,
    ) -> Result<AvailabilityResponse, AppError> {
        let path = format!(
            "/api/appointments/availability/{}",
            urlencoding::encode(doctor_id)
        );
        let date = date.format("%Y-%m-%d").to_string();
        debug!("Fetching availability for doctor {} on {}", doctor_id, date);

        let body: Value = self
            .api
            .get_with_query(&path, &[("date", date.as_str())], Some(auth.bearer_token()))
            .await?;

        ensure_success(&body)?;
        decode(body)
    }

    async fn list_doctors(
        &self,
        mode: BookingMode,
        auth: &AuthSession,
    ) -> Result<Vec<DoctorRecord>, AppError> {
        let path = match mode {
            BookingMode::Patient => "/api/doctors",
            BookingMode::Receptionist => "/api/receptionist/doctors",
        };

        let body: Value = self
            .api
            .request(Method::GET, path, Some(auth.bearer_token()), None)
            .await?;

        ensure_success(&body)?;
        decode(payload(body, "doctors"))
    }

    async fn list_patients(&self, auth: &AuthSession) -> Result<Vec<PatientRecord>, AppError> {
        let body: Value = self
            .api
            .request(
                Method::GET,
                "/api/receptionist/patients",
                Some(auth.bearer_token()),
                None,
            )
            .await?;

        ensure_success(&body)?;
        decode(payload(body, "patients"))
    }

    async fn create_appointment(
        &self,
        mode: BookingMode,
        request: &CreateAppointmentRequest,
        auth: &AuthSession,
    ) -> Result<Appointment, AppError> {
        let body: Value = self
            .api
            .request(
                Method::POST,
                Self::appointments_path(mode),
                Some(auth.bearer_token()),
                Some(json!(request)),
            )
            .await?;

        ensure_success(&body)?;
        let record: AppointmentRecord = decode(payload(body, "appointment"))?;
        record.into_appointment(request).ok_or_else(|| {
            AppError::InvalidResponse("appointment response carried no id".to_string())
        })
    }

    async fn create_bill(
        &self,
        mode: BookingMode,
        request: &CreateBillRequest,
        auth: &AuthSession,
    ) -> Result<Bill, AppError> {
        let body: Value = self
            .api
            .request(
                Method::POST,
                Self::bills_path(mode),
                Some(auth.bearer_token()),
                Some(json!(request)),
            )
            .await?;

        ensure_success(&body)?;
        let record: BillRecord = match payload(body, "bill") {
            Value::Object(map) => decode(Value::Object(map))?,
            _ => BillRecord::default(),
        };
        Ok(record.into_bill(request))
    }

    async fn cancel_appointment(
        &self,
        appointment_id: &str,
        request: &CancelAppointmentRequest,
        auth: &AuthSession,
    ) -> Result<(), AppError> {
        let path = format!(
            "/api/appointments/{}/cancel",
            urlencoding::encode(appointment_id)
        );

        let body: Value = self
            .api
            .request(Method::PUT, &path, Some(auth.bearer_token()), Some(json!(request)))
            .await?;

        ensure_success(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_ensure_success_flags_false() {
        let err = ensure_success(&json!({ "success": false, "message": "Doctor on leave" })).unwrap_err();
        assert_matches!(err, AppError::Rejected { message: Some(msg), .. } if msg == "Doctor on leave");
        assert!(ensure_success(&json!({ "success": true })).is_ok());
        assert!(ensure_success(&json!([])).is_ok());
    }

    #[test]
    fn test_payload_unwraps_envelope() {
        assert_eq!(payload(json!({ "doctors": [1, 2] }), "doctors"), json!([1, 2]));
        assert_eq!(payload(json!([1]), "doctors"), json!([1]));
    }
}
