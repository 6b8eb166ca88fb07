use thiserror::Error;

/// Outcome of a backend call that did not produce the expected payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Backend rejected request ({status:?}): {message:?}")]
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AppError {
    /// Build a rejection from a decoded error body, picking up `message` or `error`.
    pub fn rejected(status: Option<u16>, body: &serde_json::Value) -> Self {
        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .map(str::to_string);

        AppError::Rejected { status, message }
    }

    /// Message suitable for an inline banner: the backend's own words when
    /// it sent any, the caller's generic text otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            AppError::Rejected { message, .. } => message.clone(),
            AppError::Auth(msg) | AppError::NotFound(msg) if !msg.is_empty() => Some(msg.clone()),
            _ => None,
        };

        if let Some(msg) = &message {
            tracing::debug!("Surfacing backend message: {}", msg);
        }

        message.unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = AppError::rejected(Some(409), &json!({ "success": false, "message": "Slot already booked" }));
        assert_eq!(err.user_message("Failed to book appointment."), "Slot already booked");
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = AppError::rejected(Some(500), &json!({ "success": false }));
        assert_eq!(err.user_message("Failed to book appointment."), "Failed to book appointment.");

        let err = AppError::Network("connection refused".to_string());
        assert_eq!(err.user_message("Failed to book appointment."), "Failed to book appointment.");
    }

    #[test]
    fn test_rejected_reads_error_field() {
        let err = AppError::rejected(None, &json!({ "error": "Doctor unavailable" }));
        assert_eq!(
            err,
            AppError::Rejected { status: None, message: Some("Doctor unavailable".to_string()) }
        );
    }
}
