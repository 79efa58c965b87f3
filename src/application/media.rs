// src/application/media.rs
use crate::application::ObjectStorage;
use crate::domain::DomainError;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info, instrument};

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
];

/// Content type for a supported image file, keyed on its extension.
pub fn image_content_type(path: &Path) -> Option<(String, &'static str)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| (ext, *mime))
}

/// Object name derived from content, so re-uploading the same file reuses it.
pub fn object_name(prefix: &str, bytes: &[u8], ext: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    format!("{}-{}.{}", prefix, &digest[..16], ext)
}

/// Reads local image files and pushes them into a storage bucket.
pub struct ImageUploader<S: ObjectStorage> {
    storage: S,
}

impl<S: ObjectStorage> ImageUploader<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Upload the file at `path` and return its public URL.
    #[instrument(level = "debug", skip(self))]
    pub fn upload_file(
        &mut self,
        bucket: &str,
        prefix: &str,
        path: &Path,
    ) -> Result<String, DomainError> {
        let (ext, content_type) = image_content_type(path).ok_or_else(|| {
            DomainError::InvalidInput(format!("{} is not a supported image", path.display()))
        })?;

        let bytes = std::fs::read(path).map_err(|e| {
            DomainError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
        })?;
        if bytes.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "{} is empty",
                path.display()
            )));
        }

        let name = object_name(prefix, &bytes, &ext);
        debug!(%name, size = bytes.len(), "Uploading image");
        let url = self.storage.upload(bucket, &name, content_type, bytes)?;
        info!(%bucket, %url, "Uploaded image");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::MockObjectStorage;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_uppercase_extension_when_detecting_type_then_normalized() {
        let (ext, mime) = image_content_type(Path::new("a/photo.JPG")).unwrap();
        assert_eq!(ext, "jpg");
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn given_non_image_when_detecting_type_then_none() {
        assert!(image_content_type(Path::new("notes.txt")).is_none());
        assert!(image_content_type(Path::new("no_extension")).is_none());
    }

    #[test]
    fn given_same_bytes_when_naming_then_same_name() {
        let a = object_name("note", b"pixels", "png");
        let b = object_name("note", b"pixels", "png");
        let c = object_name("note", b"other", "png");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("note-"));
        assert!(a.ends_with(".png"));
        assert_eq!(a.len(), "note-".len() + 16 + ".png".len());
    }

    #[test]
    fn given_image_file_when_uploading_then_returns_public_url() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cat.png");
        fs::write(&path, b"\x89PNG fake").unwrap();
        let mut uploader = ImageUploader::new(MockObjectStorage::new());

        // Act
        let url = uploader.upload_file("product-images", "note", &path).unwrap();

        // Assert
        assert!(url.starts_with("https://storage.test/product-images/note-"));
        let (bucket, _, mime, size) = &uploader.storage().uploads[0];
        assert_eq!(bucket, "product-images");
        assert_eq!(mime, "image/png");
        assert_eq!(*size, 9);
    }

    #[test]
    fn given_unsupported_file_when_uploading_then_invalid_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        fs::write(&path, b"%PDF").unwrap();
        let mut uploader = ImageUploader::new(MockObjectStorage::new());

        let result = uploader.upload_file("avatars", "u1", &path);

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(uploader.storage().uploads.is_empty());
    }

    #[test]
    fn given_missing_file_when_uploading_then_invalid_input() {
        let mut uploader = ImageUploader::new(MockObjectStorage::new());

        let result = uploader.upload_file("avatars", "u1", Path::new("/nonexistent/x.png"));

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }
}
