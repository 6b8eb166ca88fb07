use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BOOKING_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_PAYMENT_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub booking_window_days: i64,
    pub payment_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("CLINIC_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_URL not set, using empty value");
                    String::new()
                }),
            request_timeout_secs: parse_or_default(
                "CLINIC_API_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            booking_window_days: parse_or_default(
                "CLINIC_BOOKING_WINDOW_DAYS",
                DEFAULT_BOOKING_WINDOW_DAYS,
            ),
            payment_delay_ms: parse_or_default(
                "CLINIC_PAYMENT_DELAY_MS",
                DEFAULT_PAYMENT_DELAY_MS,
            ),
        };

        if !config.is_configured() {
            warn!("Booking client not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            booking_window_days: DEFAULT_BOOKING_WINDOW_DAYS,
            payment_delay_ms: DEFAULT_PAYMENT_DELAY_MS,
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", key, default);
            default
        }
    }
}
