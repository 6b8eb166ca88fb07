use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthSession, Role};

pub struct TestConfig {
    pub api_base_url: String,
    pub booking_window_days: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            booking_window_days: 30,
        }
    }
}

impl TestConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_base_url.clone(),
            request_timeout_secs: 5,
            booking_window_days: self.booking_window_days,
            payment_delay_ms: 0,
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            role: Role::Patient,
        }
    }
}

impl TestUser {
    pub fn new(name: &str, email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        }
    }

    pub fn patient(name: &str) -> Self {
        Self::new(name, "patient@example.com", Role::Patient)
    }

    pub fn receptionist(name: &str) -> Self {
        Self::new(name, "front-desk@example.com", Role::Receptionist)
    }

    pub fn doctor(name: &str) -> Self {
        Self::new(name, "doctor@example.com", Role::Doctor)
    }

    pub fn token(&self) -> String {
        format!("test-token-{}", self.id)
    }

    pub fn to_session(&self) -> AuthSession {
        AuthSession::new(&self.id, &self.name, self.role, &self.token()).with_email(&self.email)
    }
}

/// Canned backend bodies in the shapes the clinic API returns.
pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn doctor(id: &str, name: &str, fee: f64) -> Value {
        json!({
            "_id": id,
            "user": { "name": name, "email": format!("{}@clinic.test", id) },
            "specialization": "General Medicine",
            "qualification": "MBBS",
            "experience": 8,
            "consultationFee": fee
        })
    }

    pub fn doctors_envelope(doctors: Vec<Value>) -> Value {
        json!({ "success": true, "doctors": doctors })
    }

    pub fn patient(id: &str, name: &str, email: &str) -> Value {
        json!({
            "_id": id,
            "name": name,
            "email": email,
            "contactNumber": "555-0100"
        })
    }

    pub fn availability(all: &[&str], available: &[&str], booked: &[&str], fee: f64) -> Value {
        json!({
            "success": true,
            "allSlots": all,
            "timeSlots": available,
            "bookedSlots": booked,
            "doctor": { "consultationFee": fee }
        })
    }

    pub fn appointment_created(id: &str, doctor_id: &str, date: &str, time: &str) -> Value {
        json!({
            "success": true,
            "appointment": {
                "_id": id,
                "doctor": doctor_id,
                "date": date,
                "time": time,
                "status": "booked"
            }
        })
    }

    pub fn bill_created(id: &str, appointment_id: &str, amount: f64) -> Value {
        json!({
            "success": true,
            "bill": {
                "_id": id,
                "appointment": appointment_id,
                "amount": amount,
                "paymentStatus": "pending"
            }
        })
    }

    pub fn failure(message: &str) -> Value {
        json!({ "success": false, "message": message })
    }
}
