// src/domain/mod.rs
pub mod error;
pub mod note;
pub mod profile;
pub mod session;

pub use error::DomainError;
pub use note::{NewNote, Note, NoteChanges};
pub use profile::{Profile, ProfileChanges, ProfileView};
pub use session::{AuthUser, Credentials, Session};
