// src/util/testing.rs

use anyhow::Result;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{
    AuthService, NoteRepository, ObjectStorage, ProfileRepository, SessionStore,
};
use crate::domain::{
    AuthUser, Credentials, DomainError, NewNote, Note, NoteChanges, Profile, ProfileChanges,
    Session,
};

/// Remote operations a note repository can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteOp {
    List,
    Insert,
    Update,
    Delete,
}

/// In-memory stand-in for the notes table.
///
/// Rows live in a `BTreeMap` so listing is ordered by id like the real backend.
/// Every call is recorded, and any operation can be configured to fail.
///
/// # Examples
///
/// ```
/// use pnote::util::testing::{note, MockNoteRepository, NoteOp};
///
/// let mock = MockNoteRepository::builder()
///     .with_note(note(1, "milk"))
///     .with_failure(NoteOp::Insert)
///     .build();
/// assert!(mock.calls().is_empty());
/// ```
pub struct MockNoteRepository {
    rows: BTreeMap<i64, Note>,
    next_id: i64,
    failures: HashSet<NoteOp>,
    protected: HashSet<i64>,
    calls: Vec<NoteOp>,
}

impl MockNoteRepository {
    pub fn builder() -> MockNoteRepositoryBuilder {
        MockNoteRepositoryBuilder::new()
    }

    /// Operations issued so far, in order.
    pub fn calls(&self) -> &[NoteOp] {
        &self.calls
    }

    /// Current remote state.
    pub fn rows(&self) -> Vec<Note> {
        self.rows.values().cloned().collect()
    }

    /// Simulate another device changing the table behind our back.
    pub fn remove_row(&mut self, id: i64) -> Option<Note> {
        self.rows.remove(&id)
    }

    fn record(&mut self, op: NoteOp) -> Result<(), DomainError> {
        self.calls.push(op);
        if self.failures.contains(&op) {
            return Err(DomainError::Backend(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

impl NoteRepository for MockNoteRepository {
    fn list_notes(&mut self) -> Result<Vec<Note>, DomainError> {
        self.record(NoteOp::List)?;
        Ok(self.rows())
    }

    fn insert_note(&mut self, note: &NewNote) -> Result<Note, DomainError> {
        self.record(NoteOp::Insert)?;
        let id = self.next_id;
        self.next_id += 1;
        let row = Note {
            id,
            text: note.text.clone(),
            done: note.done,
            timestamp: note.timestamp,
            image: note.image.clone(),
        };
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    fn update_note(&mut self, id: i64, changes: &NoteChanges) -> Result<Note, DomainError> {
        self.record(NoteOp::Update)?;
        let row = self.rows.get_mut(&id).ok_or(DomainError::NoteNotFound(id))?;
        changes.apply_to(row);
        Ok(row.clone())
    }

    fn delete_notes(&mut self, ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        self.record(NoteOp::Delete)?;
        let mut deleted = Vec::new();
        for id in ids {
            // Protected rows are skipped silently, like a row-level delete policy
            if self.protected.contains(id) {
                continue;
            }
            if let Some(row) = self.rows.remove(id) {
                deleted.push(row.id);
            }
        }
        Ok(deleted)
    }
}

/// Builder for MockNoteRepository
pub struct MockNoteRepositoryBuilder {
    rows: BTreeMap<i64, Note>,
    next_id: Option<i64>,
    failures: HashSet<NoteOp>,
    protected: HashSet<i64>,
}

impl MockNoteRepositoryBuilder {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: None,
            failures: HashSet::new(),
            protected: HashSet::new(),
        }
    }

    /// Seed a remote row
    pub fn with_note(mut self, note: Note) -> Self {
        self.rows.insert(note.id, note);
        self
    }

    /// Seed several remote rows
    pub fn with_notes(mut self, notes: impl IntoIterator<Item = Note>) -> Self {
        for note in notes {
            self.rows.insert(note.id, note);
        }
        self
    }

    /// Id handed out by the next insert; defaults to one past the largest seeded id
    pub fn with_next_id(mut self, id: i64) -> Self {
        self.next_id = Some(id);
        self
    }

    /// Make every call of `op` fail with a backend error
    pub fn with_failure(mut self, op: NoteOp) -> Self {
        self.failures.insert(op);
        self
    }

    /// Deletes of `id` succeed without removing the row
    pub fn with_protected(mut self, id: i64) -> Self {
        self.protected.insert(id);
        self
    }

    pub fn build(self) -> MockNoteRepository {
        let next_id = self
            .next_id
            .unwrap_or_else(|| self.rows.keys().max().map_or(1, |max| max + 1));
        MockNoteRepository {
            rows: self.rows,
            next_id,
            failures: self.failures,
            protected: self.protected,
            calls: vec![],
        }
    }
}

impl Default for MockNoteRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a fresh, undone, image-less note.
pub fn note(id: i64, text: &str) -> Note {
    Note {
        id,
        text: text.to_string(),
        done: false,
        timestamp: 1_700_000_000_000 + id,
        image: None,
    }
}

pub fn session_for(email: &str) -> Session {
    Session {
        access_token: format!("token-{}", email),
        refresh_token: Some(format!("refresh-{}", email)),
        expires_at: None,
        user: AuthUser {
            id: format!("user-{}", email),
            email: Some(email.to_string()),
            created_at: None,
        },
    }
}

/// Auth service backed by a map of registered accounts.
#[derive(Default)]
pub struct MockAuthService {
    accounts: HashMap<String, String>,
    revoked: HashSet<String>,
    confirm_email: bool,
    offline: bool,
    pub signed_out: Vec<String>,
}

impl MockAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.accounts.insert(email.to_string(), password.to_string());
        self
    }

    /// Tokens for `email` are rejected by get_user
    pub fn with_revoked(mut self, email: &str) -> Self {
        self.revoked.insert(format!("token-{}", email));
        self
    }

    /// Sign-up returns no session until the address is confirmed
    pub fn with_email_confirmation(mut self) -> Self {
        self.confirm_email = true;
        self
    }

    /// Every call fails with a transport error
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn check_online(&self) -> Result<(), DomainError> {
        if self.offline {
            return Err(DomainError::Backend("connection refused".to_string()));
        }
        Ok(())
    }
}

impl AuthService for MockAuthService {
    fn sign_up(&mut self, credentials: &Credentials) -> Result<Option<Session>, DomainError> {
        self.check_online()?;
        if self.accounts.contains_key(&credentials.email) {
            return Err(DomainError::InvalidInput("User already registered".to_string()));
        }
        self.accounts
            .insert(credentials.email.clone(), credentials.password.clone());
        Ok((!self.confirm_email).then(|| session_for(&credentials.email)))
    }

    fn sign_in(&mut self, credentials: &Credentials) -> Result<Session, DomainError> {
        self.check_online()?;
        match self.accounts.get(&credentials.email) {
            Some(password) if *password == credentials.password => {
                Ok(session_for(&credentials.email))
            }
            _ => Err(DomainError::InvalidInput("Invalid login credentials".to_string())),
        }
    }

    fn sign_out(&mut self, session: &Session) -> Result<(), DomainError> {
        self.check_online()?;
        self.signed_out.push(session.access_token.clone());
        Ok(())
    }

    fn get_user(&mut self, session: &Session) -> Result<AuthUser, DomainError> {
        self.check_online()?;
        if self.revoked.contains(&session.access_token) {
            return Err(DomainError::NotAuthenticated);
        }
        Ok(session.user.clone())
    }
}

/// Session store that never touches the filesystem.
#[derive(Default)]
pub struct MemorySessionStore {
    session: RefCell<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RefCell::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, DomainError> {
        Ok(self.session.borrow().clone())
    }

    fn save(&self, session: &Session) -> Result<(), DomainError> {
        *self.session.borrow_mut() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        *self.session.borrow_mut() = None;
        Ok(())
    }
}

/// Object storage that remembers uploads and hands out predictable URLs.
#[derive(Default)]
pub struct MockObjectStorage {
    pub uploads: Vec<(String, String, String, usize)>,
    fail: bool,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            uploads: vec![],
            fail: true,
        }
    }
}

impl ObjectStorage for MockObjectStorage {
    fn upload(
        &mut self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, DomainError> {
        if self.fail {
            return Err(DomainError::Backend("upload rejected".to_string()));
        }
        self.uploads.push((
            bucket.to_string(),
            name.to_string(),
            content_type.to_string(),
            bytes.len(),
        ));
        Ok(format!("https://storage.test/{}/{}", bucket, name))
    }
}

#[derive(Default)]
pub struct MockProfileRepository {
    rows: HashMap<String, Profile>,
}

impl MockProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, user_id: &str, profile: Profile) -> Self {
        self.rows.insert(user_id.to_string(), profile);
        self
    }
}

impl ProfileRepository for MockProfileRepository {
    fn get_profile(&mut self, user_id: &str) -> Result<Option<Profile>, DomainError> {
        Ok(self.rows.get(user_id).cloned())
    }

    fn upsert_profile(
        &mut self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Profile, DomainError> {
        let row = self.rows.entry(user_id.to_string()).or_default();
        if let Some(name) = &changes.display_name {
            row.display_name = Some(name.clone());
        }
        if let Some(url) = &changes.avatar_url {
            row.avatar_url = Some(url.clone());
        }
        if let Some(phone) = &changes.phone {
            row.phone = Some(phone.clone());
        }
        Ok(row.clone())
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["reqwest", "hyper", "rustls", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        init_test_setup().expect("Failed to initialize test setup");
    }

    #[test]
    fn given_seeded_rows_when_inserting_then_assigns_next_id() {
        let mut mock = MockNoteRepository::builder()
            .with_notes([note(3, "a"), note(7, "b")])
            .build();

        let row = mock.insert_note(&NewNote::new("c", None)).expect("Insert should succeed");

        assert_eq!(row.id, 8);
        assert_eq!(mock.rows().len(), 3);
    }

    #[test]
    fn given_failure_configured_when_calling_then_records_and_fails() {
        let mut mock = MockNoteRepository::builder()
            .with_failure(NoteOp::List)
            .build();

        assert!(matches!(mock.list_notes(), Err(DomainError::Backend(_))));
        assert_eq!(mock.calls(), &[NoteOp::List]);
    }

    #[test]
    fn given_missing_row_when_updating_then_not_found() {
        let mut mock = MockNoteRepository::builder().build();

        let result = mock.update_note(42, &NoteChanges::done(true));

        assert!(matches!(result, Err(DomainError::NoteNotFound(42))));
    }

    #[test]
    fn given_partial_id_list_when_deleting_then_returns_only_existing_ids() {
        let mut mock = MockNoteRepository::builder()
            .with_notes([note(1, "a"), note(2, "b")])
            .build();

        let deleted = mock.delete_notes(&[2, 99]).expect("Delete should succeed");

        assert_eq!(deleted, vec![2]);
        assert_eq!(mock.rows(), vec![note(1, "a")]);
    }

    #[test]
    fn given_memory_store_when_saving_and_clearing_then_round_trips() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&session_for("a@b.c")).unwrap();
        assert_eq!(store.load().unwrap(), Some(session_for("a@b.c")));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
