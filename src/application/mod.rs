// src/application/mod.rs
pub mod media;
pub mod note_store;
pub mod profile_service;
pub mod repository;
pub mod session_gate;

pub use media::ImageUploader;
pub use note_store::NoteStore;
pub use profile_service::ProfileService;
pub use repository::{AuthService, NoteRepository, ObjectStorage, ProfileRepository, SessionStore};
pub use session_gate::{Route, SessionGate};
