// src/application/profile_service.rs
use crate::application::{ImageUploader, ObjectStorage, ProfileRepository};
use crate::domain::{DomainError, Profile, ProfileChanges, ProfileView, Session};
use std::path::Path;
use tracing::{info, instrument};

pub struct ProfileService<P: ProfileRepository, S: ObjectStorage> {
    repository: P,
    uploader: ImageUploader<S>,
    avatar_bucket: String,
}

impl<P: ProfileRepository, S: ObjectStorage> ProfileService<P, S> {
    pub fn new(repository: P, storage: S, avatar_bucket: impl Into<String>) -> Self {
        Self {
            repository,
            uploader: ImageUploader::new(storage),
            avatar_bucket: avatar_bucket.into(),
        }
    }

    /// Profile row joined with the auth user's email and sign-up date.
    #[instrument(level = "debug", skip(self))]
    pub fn view(&mut self, session: &Session) -> Result<ProfileView, DomainError> {
        let profile = self
            .repository
            .get_profile(&session.user.id)?
            .unwrap_or_default();
        Ok(ProfileView {
            profile,
            email: session.user.email.clone(),
            created_at: session.user.created_at,
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn update(
        &mut self,
        session: &Session,
        changes: &ProfileChanges,
    ) -> Result<Profile, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::InvalidInput("nothing to update".to_string()));
        }
        if let Some(name) = &changes.display_name {
            if name.trim().is_empty() {
                return Err(DomainError::InvalidInput(
                    "display name cannot be blank".to_string(),
                ));
            }
        }
        let profile = self.repository.upsert_profile(&session.user.id, changes)?;
        info!(user_id = %session.user.id, "Updated profile");
        Ok(profile)
    }

    /// Upload a new avatar and point the profile at it.
    #[instrument(level = "debug", skip(self))]
    pub fn set_avatar(&mut self, session: &Session, path: &Path) -> Result<Profile, DomainError> {
        let url = self
            .uploader
            .upload_file(&self.avatar_bucket, &session.user.id, path)?;
        let changes = ProfileChanges {
            avatar_url: Some(url),
            ..ProfileChanges::default()
        };
        self.repository.upsert_profile(&session.user.id, &changes)
    }
}
