// src/infrastructure/mod.rs
pub mod backend;
pub mod config;
pub mod session_file;

pub use backend::{BackendClient, RestNoteRepository, RestProfileRepository, StorageBuckets};
pub use config::Config;
pub use session_file::FileSessionStore;
