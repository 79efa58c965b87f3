// src/infrastructure/session_file.rs
use crate::application::SessionStore;
use crate::domain::{DomainError, Session};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Session persisted as a JSON file.
///
/// Writes go through a temp file in the same directory and a rename, so a
/// crash never leaves a half-written session behind. The temp file is created
/// owner-readable only.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, DomainError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| DomainError::Storage(format!("Failed to read session: {}", e)))?;

        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // Unreadable session behaves like no session
                warn!(path = ?self.path, error = %e, "Ignoring corrupt session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), DomainError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .map_err(|e| DomainError::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;

        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| DomainError::Storage(format!("Failed to serialize session: {}", e)))?;

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| DomainError::Storage(format!("Failed to create temp file: {}", e)))?;
        tmp.write_all(&json)
            .map_err(|e| DomainError::Storage(format!("Failed to write session: {}", e)))?;
        tmp.persist(&self.path)
            .map_err(|e| DomainError::Storage(format!("Failed to persist session: {}", e)))?;

        debug!(path = ?self.path, "Saved session");
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = ?self.path, "Removed session");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Storage(format!(
                "Failed to remove session: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::session_for;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_no_file_when_loading_then_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn given_saved_session_when_loading_then_same_session() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("deep/dir/session.json"));
        let session = session_for("a@b.co");

        // Act
        store.save(&session).unwrap();
        let loaded = store.load().unwrap();

        // Assert
        assert_eq!(loaded, Some(session));
    }

    #[test]
    fn given_saved_session_when_clearing_then_file_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        store.save(&session_for("a@b.co")).unwrap();

        store.clear().unwrap();

        assert!(!path.exists());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn given_corrupt_file_when_loading_then_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn given_existing_session_when_saving_then_overwritten() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&session_for("old@b.co")).unwrap();

        store.save(&session_for("new@b.co")).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.user.email.as_deref(), Some("new@b.co"));
    }
}
