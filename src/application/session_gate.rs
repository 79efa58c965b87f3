// src/application/session_gate.rs
use crate::application::{AuthService, SessionStore};
use crate::domain::{Credentials, DomainError, Session};
use tracing::{debug, info, instrument, warn};

/// Where startup should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A valid session exists; show the note list.
    Notes(Session),
    /// Nobody is signed in; show the welcome/login flow.
    Welcome,
}

/// Decides between the note list and the welcome screen, and owns the
/// sign-up/sign-in/sign-out transitions that move between them.
pub struct SessionGate<A: AuthService, S: SessionStore> {
    auth: A,
    store: S,
}

impl<A: AuthService, S: SessionStore> SessionGate<A, S> {
    pub fn new(auth: A, store: S) -> Self {
        Self { auth, store }
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check the persisted session with one backend call.
    ///
    /// A session the backend rejects is forgotten.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&mut self) -> Result<Route, DomainError> {
        let Some(mut session) = self.store.load()? else {
            debug!("No stored session");
            return Ok(Route::Welcome);
        };

        match self.auth.get_user(&session) {
            Ok(user) => {
                debug!(user_id = %user.id, "Stored session accepted");
                session.user = user;
                Ok(Route::Notes(session))
            }
            Err(DomainError::NotAuthenticated) => {
                warn!("Stored session rejected, clearing it");
                self.store.clear()?;
                Ok(Route::Welcome)
            }
            Err(e) => Err(e),
        }
    }

    /// Like `resolve`, but not being signed in is an error.
    pub fn require_session(&mut self) -> Result<Session, DomainError> {
        match self.resolve()? {
            Route::Notes(session) => Ok(session),
            Route::Welcome => Err(DomainError::NotAuthenticated),
        }
    }

    /// Register an account. Returns the session if the backend signed the user
    /// in immediately.
    #[instrument(level = "debug", skip(self))]
    pub fn sign_up(&mut self, credentials: &Credentials) -> Result<Option<Session>, DomainError> {
        credentials.validate()?;
        let session = self.auth.sign_up(credentials)?;
        match &session {
            Some(session) => {
                self.store.save(session)?;
                info!(user_id = %session.user.id, "Registered and signed in");
            }
            None => info!(email = %credentials.email, "Registered, confirmation pending"),
        }
        Ok(session)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn sign_in(&mut self, credentials: &Credentials) -> Result<Session, DomainError> {
        let session = self.auth.sign_in(credentials)?;
        self.store.save(&session)?;
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Forget the local session, then tell the backend.
    ///
    /// Returns whether a session existed.
    #[instrument(level = "debug", skip(self))]
    pub fn sign_out(&mut self) -> Result<bool, DomainError> {
        let Some(session) = self.store.load()? else {
            return Ok(false);
        };
        self.store.clear()?;
        self.auth.sign_out(&session)?;
        info!(user_id = %session.user.id, "Signed out");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{session_for, MemorySessionStore, MockAuthService};

    #[test]
    fn given_no_stored_session_when_resolving_then_welcome() {
        let mut gate = SessionGate::new(MockAuthService::new(), MemorySessionStore::new());

        assert_eq!(gate.resolve().unwrap(), Route::Welcome);
    }

    #[test]
    fn given_valid_stored_session_when_resolving_then_notes() {
        // Arrange
        let session = session_for("a@b.co");
        let mut gate = SessionGate::new(
            MockAuthService::new(),
            MemorySessionStore::with_session(session.clone()),
        );

        // Act
        let route = gate.resolve().unwrap();

        // Assert
        assert_eq!(route, Route::Notes(session));
    }

    #[test]
    fn given_revoked_session_when_resolving_then_welcome_and_cleared() {
        // Arrange
        let mut gate = SessionGate::new(
            MockAuthService::new().with_revoked("a@b.co"),
            MemorySessionStore::with_session(session_for("a@b.co")),
        );

        // Act
        let route = gate.resolve().unwrap();

        // Assert
        assert_eq!(route, Route::Welcome);
        assert!(gate.store().load().unwrap().is_none());
    }

    #[test]
    fn given_backend_down_when_resolving_then_error_and_session_kept() {
        let mut gate = SessionGate::new(
            MockAuthService::new().offline(),
            MemorySessionStore::with_session(session_for("a@b.co")),
        );

        assert!(matches!(gate.resolve(), Err(DomainError::Backend(_))));
        assert!(gate.store().load().unwrap().is_some());
    }

    #[test]
    fn given_no_session_when_requiring_then_not_authenticated() {
        let mut gate = SessionGate::new(MockAuthService::new(), MemorySessionStore::new());

        assert!(matches!(
            gate.require_session(),
            Err(DomainError::NotAuthenticated)
        ));
    }

    #[test]
    fn given_registered_account_when_signing_in_then_session_persisted() {
        let mut gate = SessionGate::new(
            MockAuthService::new().with_account("a@b.co", "secret1"),
            MemorySessionStore::new(),
        );

        let session = gate
            .sign_in(&Credentials::new("a@b.co", "secret1"))
            .unwrap();

        assert_eq!(gate.store().load().unwrap(), Some(session));
    }

    #[test]
    fn given_wrong_password_when_signing_in_then_nothing_persisted() {
        let mut gate = SessionGate::new(
            MockAuthService::new().with_account("a@b.co", "secret1"),
            MemorySessionStore::new(),
        );

        let result = gate.sign_in(&Credentials::new("a@b.co", "wrong!!"));

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(gate.store().load().unwrap().is_none());
    }

    #[test]
    fn given_invalid_email_when_signing_up_then_rejected_locally() {
        let mut gate = SessionGate::new(MockAuthService::new().offline(), MemorySessionStore::new());

        let result = gate.sign_up(&Credentials::new("nope", "secret1"));

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn given_confirmation_required_when_signing_up_then_no_session() {
        let mut gate = SessionGate::new(
            MockAuthService::new().with_email_confirmation(),
            MemorySessionStore::new(),
        );

        let session = gate
            .sign_up(&Credentials::new("new@b.co", "secret1"))
            .unwrap();

        assert!(session.is_none());
        assert!(gate.store().load().unwrap().is_none());
    }

    #[test]
    fn given_instant_signup_when_signing_up_then_routes_to_notes() {
        let mut gate = SessionGate::new(MockAuthService::new(), MemorySessionStore::new());

        gate.sign_up(&Credentials::new("new@b.co", "secret1"))
            .unwrap();

        assert!(matches!(gate.resolve().unwrap(), Route::Notes(_)));
    }

    #[test]
    fn given_session_when_signing_out_then_cleared_and_backend_told() {
        let session = session_for("a@b.co");
        let mut gate = SessionGate::new(
            MockAuthService::new(),
            MemorySessionStore::with_session(session.clone()),
        );

        assert!(gate.sign_out().unwrap());
        assert!(gate.store().load().unwrap().is_none());
        assert_eq!(gate.auth().signed_out, vec![session.access_token]);
    }

    #[test]
    fn given_backend_down_when_signing_out_then_local_session_still_cleared() {
        let mut gate = SessionGate::new(
            MockAuthService::new().offline(),
            MemorySessionStore::with_session(session_for("a@b.co")),
        );

        assert!(gate.sign_out().is_err());
        assert!(gate.store().load().unwrap().is_none());
    }

    #[test]
    fn given_no_session_when_signing_out_then_false() {
        let mut gate = SessionGate::new(MockAuthService::new(), MemorySessionStore::new());

        assert!(!gate.sign_out().unwrap());
    }
}
