// src/infrastructure/backend/storage.rs
use super::BackendClient;
use crate::application::ObjectStorage;
use crate::domain::DomainError;
use reqwest::blocking::RequestBuilder;
use reqwest::Method;
use tracing::instrument;

const OBJECT_PREFIX: &str = "storage/v1/object";

/// Public URL of an object in a public bucket.
fn public_url(base_url: &str, bucket: &str, name: &str) -> String {
    format!(
        "{}/{}/public/{}/{}",
        base_url.trim_end_matches('/'),
        OBJECT_PREFIX,
        bucket,
        name
    )
}

/// Object storage buckets, written with the signed-in user's token.
#[derive(Debug, Clone)]
pub struct StorageBuckets {
    client: BackendClient,
}

impl StorageBuckets {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn upload_request(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> RequestBuilder {
        let path = format!("{}/{}/{}", OBJECT_PREFIX, bucket, name);
        self.client
            .request(Method::POST, &path)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
    }
}

impl ObjectStorage for StorageBuckets {
    #[instrument(level = "debug", skip(self, bytes), fields(size = bytes.len()))]
    fn upload(
        &mut self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, DomainError> {
        let request = self.upload_request(bucket, name, content_type, bytes);
        self.client.send(request)?;
        Ok(public_url(self.client.base_url(), bucket, name))
    }
}
