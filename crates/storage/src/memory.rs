//! In-process media store.
//!
//! Objects live in a `HashMap` behind a `RwLock`. Used by integration tests and
//! by `STORAGE_BACKEND=memory` for local development without S3.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{MediaStore, StorageError, StoredObject};

#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

pub struct MemoryMediaStore {
    base_url: String,
    objects: RwLock<HashMap<String, MemoryObject>>,
    /// Number of `put` calls allowed to succeed before every later one fails.
    fail_after: Option<usize>,
    puts: AtomicUsize,
}

impl MemoryMediaStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
            fail_after: None,
            puts: AtomicUsize::new(0),
        }
    }

    /// A store whose `put` fails once `successes` uploads have gone through.
    pub fn failing_after(base_url: impl Into<String>, successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::new(base_url)
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn get(&self, key: &str) -> Option<MemoryObject> {
        self.objects.read().await.get(key).cloned()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| attempt >= limit) {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "injected failure".into(),
            });
        }

        self.objects.write().await.insert(
            key.to_string(),
            MemoryObject {
                body,
                content_type: content_type.to_string(),
            },
        );

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn public_base_url(&self) -> &str {
        &self.base_url
    }
}
