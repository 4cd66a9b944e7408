//! Object storage for uploaded media.
//!
//! - [`MediaStore`] -- the seam between HTTP handlers and the blob store.
//! - [`s3::S3MediaStore`] -- S3 (or S3-compatible) implementation.
//! - [`memory::MemoryMediaStore`] -- in-process implementation for tests and
//!   local development.
//! - [`batch::UploadBatch`] -- tracks the objects written during one request so
//!   they can be removed again when the database write fails.

use async_trait::async_trait;

pub mod batch;
pub mod memory;
pub mod s3;

pub use batch::{purge_urls, UploadBatch};
pub use memory::MemoryMediaStore;
pub use s3::{S3Config, S3MediaStore};

/// An object that was written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Publicly reachable URL; this is what gets persisted in the database.
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to upload '{key}': {message}")]
    Upload { key: String, message: String },

    #[error("Failed to delete '{key}': {message}")]
    Delete { key: String, message: String },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// A blob store holding media referenced by URL from the relational rows.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Write `body` under `key` and return where it can be fetched.
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Remove the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), StorageError>;

    /// Base URL prepended to keys to form public URLs.
    fn public_base_url(&self) -> &str;

    /// Public URL for `key`.
    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url().trim_end_matches('/'))
    }

    /// Recover the object key from a URL produced by [`MediaStore::public_url`].
    ///
    /// Returns `None` for URLs that do not belong to this store.
    fn key_for_url(&self, url: &str) -> Option<String> {
        let base = self.public_base_url().trim_end_matches('/');
        url.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_for_url_reverses_public_url() {
        let store = MemoryMediaStore::new("https://cdn.example.com/media/");
        let url = store.public_url("models/images/1/a.png");
        assert_eq!(url, "https://cdn.example.com/media/models/images/1/a.png");
        assert_eq!(
            store.key_for_url(&url).as_deref(),
            Some("models/images/1/a.png")
        );
    }

    #[test]
    fn key_for_url_rejects_foreign_urls() {
        let store = MemoryMediaStore::new("https://cdn.example.com/media");
        assert_eq!(store.key_for_url("https://elsewhere.com/media/x.png"), None);
        assert_eq!(store.key_for_url("https://cdn.example.com/media"), None);
        assert_eq!(store.key_for_url("https://cdn.example.com/mediax/y.png"), None);
    }
}
