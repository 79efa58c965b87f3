// src/infrastructure/backend/auth.rs
use super::BackendClient;
use crate::application::AuthService;
use crate::domain::{AuthUser, Credentials, DomainError, Session};
use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

const SIGNUP_PATH: &str = "auth/v1/signup";
const TOKEN_PATH: &str = "auth/v1/token";
const LOGOUT_PATH: &str = "auth/v1/logout";
const USER_PATH: &str = "auth/v1/user";

/// Shape shared by the token grant and sign-up responses. Sign-up without
/// auto-confirm returns only the user, so everything is optional.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<AuthUser>,
}

impl TokenResponse {
    fn into_session(self) -> Option<Session> {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        Some(Session {
            access_token: self.access_token?,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user?,
        })
    }
}

impl AuthService for BackendClient {
    #[instrument(level = "debug", skip(self))]
    fn sign_up(&mut self, credentials: &Credentials) -> Result<Option<Session>, DomainError> {
        let request = self.request(Method::POST, SIGNUP_PATH).json(credentials);
        let response: TokenResponse = self.send_json(request)?;
        Ok(response.into_session())
    }

    #[instrument(level = "debug", skip(self))]
    fn sign_in(&mut self, credentials: &Credentials) -> Result<Session, DomainError> {
        let request = self
            .request(Method::POST, TOKEN_PATH)
            .query(&[("grant_type", "password")])
            .json(credentials);
        let response: TokenResponse = self.send_json(request)?;
        response
            .into_session()
            .ok_or_else(|| DomainError::Backend("token response carried no session".to_string()))
    }

    #[instrument(level = "debug", skip(self))]
    fn sign_out(&mut self, session: &Session) -> Result<(), DomainError> {
        let request = self.request_as(Method::POST, LOGOUT_PATH, &session.access_token);
        self.send(request)?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn get_user(&mut self, session: &Session) -> Result<AuthUser, DomainError> {
        let request = self.request_as(Method::GET, USER_PATH, &session.access_token);
        self.send_json(request)
    }
}
