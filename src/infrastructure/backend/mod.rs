// src/infrastructure/backend/mod.rs
//
// HTTP adapters for the hosted backend: PostgREST tables under /rest/v1,
// GoTrue auth under /auth/v1 and object storage under /storage/v1.
mod auth;
mod rest;
mod storage;

pub use rest::{RestNoteRepository, RestProfileRepository};
pub use storage::StorageBuckets;

use crate::domain::{DomainError, Session};
use crate::infrastructure::config::BackendConfig;
use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

/// Shared HTTP plumbing: base URL, anon key and the signed-in user's token.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("pnote/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: None,
        })
    }

    /// Act on behalf of the session's user; row-level security keys off this token.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.access_token = Some(session.access_token.clone());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request with `apikey` and bearer set; the bearer is the user token if
    /// any, else the anon key.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.request_as(method, path, token)
    }

    fn request_as(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Send and turn transport failures and non-2xx statuses into domain errors.
    fn send(&self, request: RequestBuilder) -> Result<Response, DomainError> {
        let response = request
            .send()
            .map_err(|e| DomainError::Backend(format!("request failed: {}", e)))?;

        let status = response.status();
        trace!(%status, url = %response.url(), "Backend response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        debug!(%status, %body, "Backend rejected request");
        Err(classify(status, &body))
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DomainError> {
        self.send(request)?
            .json::<T>()
            .map_err(|e| DomainError::Backend(format!("unexpected response body: {}", e)))
    }
}

/// Error bodies differ between services; take the first message-like field.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn text(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

pub(crate) fn classify(status: StatusCode, body: &str) -> DomainError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::text)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DomainError::NotAuthenticated,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            DomainError::InvalidInput(message)
        }
        _ => DomainError::Backend(format!("{}: {}", status, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: "https://abc.example.co/".to_string(),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn given_trailing_slash_when_building_url_then_single_separator() {
        let client = client();
        assert_eq!(client.base_url(), "https://abc.example.co");
        assert_eq!(client.url("/rest/v1/todos"), "https://abc.example.co/rest/v1/todos");
    }

    #[test]
    fn given_anonymous_client_when_building_request_then_bearer_is_anon_key() {
        let request = client().request(Method::GET, "rest/v1/todos").build().unwrap();

        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["authorization"], "Bearer anon");
    }

    #[test]
    fn given_session_when_building_request_then_bearer_is_access_token() {
        let session = crate::util::testing::session_for("a@b.co");
        let request = client()
            .with_session(&session)
            .request(Method::GET, "rest/v1/todos")
            .build()
            .unwrap();

        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["authorization"], "Bearer token-a@b.co");
    }

    #[test]
    fn given_unauthorized_when_classifying_then_not_authenticated() {
        let err = classify(StatusCode::UNAUTHORIZED, r#"{"message":"JWT expired"}"#);
        assert!(matches!(err, DomainError::NotAuthenticated));
    }

    #[test]
    fn given_bad_grant_when_classifying_then_invalid_input_with_description() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        match err {
            DomainError::InvalidInput(msg) => assert_eq!(msg, "Invalid login credentials"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn given_server_error_with_plain_body_when_classifying_then_backend() {
        let err = classify(StatusCode::BAD_GATEWAY, "upstream down\n");
        match err {
            DomainError::Backend(msg) => {
                assert!(msg.contains("502"));
                assert!(msg.ends_with("upstream down"));
            }
            other => panic!("Expected Backend, got {:?}", other),
        }
    }
}
