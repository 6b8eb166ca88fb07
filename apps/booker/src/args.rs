use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use std::env;

use shared_models::auth::{AuthSession, Role};

/// What to book, taken from `--flag value` pairs on the command line.
#[derive(Debug)]
pub struct BookingArgs {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    pub notes: String,
    pub patient_id: Option<String>,
}

pub const USAGE: &str = "usage: clinic-booker --doctor <id> --date <YYYY-MM-DD> --time <HH:MM> \
--reason <text> [--notes <text>] [--patient <id>]";

impl BookingArgs {
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut doctor_id = None;
        let mut date = None;
        let mut time = None;
        let mut reason = None;
        let mut notes = String::new();
        let mut patient_id = None;

        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let value = args
                .next()
                .ok_or_else(|| anyhow!("missing value for {}", flag))?;

            match flag.as_str() {
                "--doctor" => doctor_id = Some(value),
                "--date" => {
                    let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .with_context(|| format!("invalid date '{}'", value))?;
                    date = Some(parsed);
                }
                "--time" => time = Some(value),
                "--reason" => reason = Some(value),
                "--notes" => notes = value,
                "--patient" => patient_id = Some(value),
                other => bail!("unknown flag {}\n{}", other, USAGE),
            }
        }

        Ok(Self {
            doctor_id: doctor_id.ok_or_else(|| anyhow!("--doctor is required\n{}", USAGE))?,
            date: date.ok_or_else(|| anyhow!("--date is required\n{}", USAGE))?,
            time: time.ok_or_else(|| anyhow!("--time is required\n{}", USAGE))?,
            reason: reason.unwrap_or_default(),
            notes,
            patient_id,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} must be set", name))
}

/// The signed-in user, read from `CLINIC_AUTH_TOKEN`, `CLINIC_USER_ID`,
/// `CLINIC_USER_NAME` and `CLINIC_USER_ROLE`.
pub fn auth_from_env() -> Result<AuthSession> {
    let token = required_var("CLINIC_AUTH_TOKEN")?;
    let user_id = required_var("CLINIC_USER_ID")?;
    let name = env::var("CLINIC_USER_NAME").unwrap_or_default();
    let role: Role = env::var("CLINIC_USER_ROLE")
        .unwrap_or_else(|_| "patient".to_string())
        .parse()
        .map_err(|e: String| anyhow!(e))?;

    let mut auth = AuthSession::new(&user_id, &name, role, &token);
    if let Ok(email) = env::var("CLINIC_USER_EMAIL") {
        auth = auth.with_email(&email);
    }
    Ok(auth)
}

pub struct CardInput {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub cardholder_name: Option<String>,
}

pub fn card_from_env() -> Result<CardInput> {
    Ok(CardInput {
        number: required_var("CLINIC_CARD_NUMBER")?,
        expiry: required_var("CLINIC_CARD_EXPIRY")?,
        cvv: required_var("CLINIC_CARD_CVV")?,
        cardholder_name: env::var("CLINIC_CARDHOLDER_NAME").ok(),
    })
}
