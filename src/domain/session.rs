// src/domain/session.rs
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::DomainError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Session issued by the auth service and persisted between runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Epoch seconds, when the backend reports it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Checks applied before registering a new account.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !email_regex().is_match(&self.email) {
            return Err(DomainError::InvalidInput(format!(
                "'{}' is not an email address",
                self.email
            )));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Failed to compile email regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_valid_credentials_when_validating_then_ok() {
        let creds = Credentials::new(" user@example.com ", "secret1");
        assert_eq!(creds.email, "user@example.com");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn given_malformed_email_when_validating_then_invalid_input() {
        let creds = Credentials::new("user.example.com", "secret1");
        assert!(matches!(creds.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn given_short_password_when_validating_then_invalid_input() {
        let creds = Credentials::new("user@example.com", "12345");
        let err = creds.validate().unwrap_err();
        assert!(err.to_string().contains("at least 6"));
    }

    #[test]
    fn given_session_when_debug_formatting_then_hides_tokens() {
        let session = Session {
            access_token: "very-secret".to_string(),
            refresh_token: Some("also-secret".to_string()),
            expires_at: None,
            user: AuthUser {
                id: "u1".to_string(),
                email: None,
                created_at: None,
            },
        };
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("u1"));
    }
}
