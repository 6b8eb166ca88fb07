use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Receptionist,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
            Role::Receptionist => write!(f, "receptionist"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "receptionist" => Ok(Role::Receptionist),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// The signed-in user, passed explicitly to anything that talks to the backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    #[serde(skip_serializing)]
    pub token: String,
}

impl AuthSession {
    pub fn new(user_id: &str, name: &str, role: Role, token: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: None,
            role,
            token: token.to_string(),
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn bearer_token(&self) -> &str {
        &self.token
    }
}

// Keeps the bearer token out of logs.
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Receptionist".parse::<Role>().unwrap(), Role::Receptionist);
        assert_eq!(" patient ".parse::<Role>().unwrap(), Role::Patient);
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let session = AuthSession::new("u1", "Jane Roe", Role::Patient, "secret-token");
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("Jane Roe"));
    }
}
