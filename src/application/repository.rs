// src/application/repository.rs
use crate::domain::{
    AuthUser, Credentials, DomainError, NewNote, Note, NoteChanges, Profile, ProfileChanges,
    Session,
};

pub trait NoteRepository {
    /// Every row visible to the current user, ordered by id. No pagination.
    fn list_notes(&mut self) -> Result<Vec<Note>, DomainError>;

    /// Insert a row and return it with the backend-assigned id.
    fn insert_note(&mut self, note: &NewNote) -> Result<Note, DomainError>;

    /// Update the row with `id`. Zero matched rows is `NoteNotFound`.
    fn update_note(&mut self, id: i64, changes: &NoteChanges) -> Result<Note, DomainError>;

    /// Delete all rows whose id is in `ids`, returning the ids actually deleted.
    fn delete_notes(&mut self, ids: &[i64]) -> Result<Vec<i64>, DomainError>;
}

pub trait ProfileRepository {
    /// `None` when no row exists yet for the user.
    fn get_profile(&mut self, user_id: &str) -> Result<Option<Profile>, DomainError>;

    /// Insert or merge the row for `user_id`.
    fn upsert_profile(
        &mut self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Profile, DomainError>;
}

pub trait AuthService {
    /// Returns a session when the backend signs the user in right away,
    /// `None` when the address has to be confirmed first.
    fn sign_up(&mut self, credentials: &Credentials) -> Result<Option<Session>, DomainError>;

    fn sign_in(&mut self, credentials: &Credentials) -> Result<Session, DomainError>;

    fn sign_out(&mut self, session: &Session) -> Result<(), DomainError>;

    /// Validates the session token; `NotAuthenticated` if rejected.
    fn get_user(&mut self, session: &Session) -> Result<AuthUser, DomainError>;
}

pub trait ObjectStorage {
    /// Upload `bytes` under `name` in `bucket`, overwriting, and return the public URL.
    fn upload(
        &mut self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, DomainError>;
}

/// Local key-value persistence for the signed-in session.
pub trait SessionStore {
    fn load(&self) -> Result<Option<Session>, DomainError>;
    fn save(&self, session: &Session) -> Result<(), DomainError>;
    fn clear(&self) -> Result<(), DomainError>;
}
