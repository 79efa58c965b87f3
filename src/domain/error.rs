// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Note not found: {0}")]
    NoteNotFound(i64),
    #[error("Note needs text or an image")]
    EmptyNote,
    #[error("Not signed in or session rejected by backend")]
    NotAuthenticated,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Local storage error: {0}")]
    Storage(String),
}
