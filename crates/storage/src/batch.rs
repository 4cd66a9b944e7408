//! Per-request upload tracking and orphan cleanup.
//!
//! Media are uploaded before the rows that reference them are committed. If
//! the commit (or a later upload) fails, the objects already written would be
//! orphaned; [`UploadBatch::discard`] removes them.

use std::sync::Arc;

use futures::future::join_all;

use crate::{MediaStore, StorageError, StoredObject};

/// Objects written to a [`MediaStore`] during one request.
pub struct UploadBatch {
    store: Arc<dyn MediaStore>,
    uploaded: Vec<StoredObject>,
}

impl UploadBatch {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self {
            store,
            uploaded: Vec::new(),
        }
    }

    /// Upload one object and remember it for cleanup.
    pub async fn put(
        &mut self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let stored = self.store.put(key, body, content_type).await?;
        self.uploaded.push(stored.clone());
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.uploaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty()
    }

    /// Keep every uploaded object; the referencing rows were committed.
    pub fn commit(self) -> Vec<StoredObject> {
        self.uploaded
    }

    /// Delete every object uploaded through this batch.
    ///
    /// Best effort: failures are logged and do not stop the remaining deletes.
    /// Returns the number of objects that could not be removed.
    pub async fn discard(self) -> usize {
        if self.uploaded.is_empty() {
            return 0;
        }
        let store = &self.store;
        let results = join_all(self.uploaded.iter().map(|obj| store.delete(&obj.key))).await;

        let mut failed = 0;
        for (obj, result) in self.uploaded.iter().zip(results) {
            if let Err(e) = result {
                failed += 1;
                tracing::warn!(key = %obj.key, error = %e, "Failed to remove orphaned upload");
            }
        }
        tracing::info!(
            removed = self.uploaded.len() - failed,
            failed,
            "Discarded upload batch"
        );
        failed
    }
}

/// Delete the objects behind previously persisted URLs.
///
/// Used after a row deletion has been committed. URLs that do not belong to
/// `store` are skipped; failures are logged. Returns the number of failures.
pub async fn purge_urls<'a, I>(store: &dyn MediaStore, urls: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let keys: Vec<String> = urls
        .into_iter()
        .filter_map(|url| {
            let key = store.key_for_url(url);
            if key.is_none() {
                tracing::warn!(url, "Skipping media URL outside the configured store");
            }
            key
        })
        .collect();

    let results = join_all(keys.iter().map(|key| store.delete(key))).await;
    let mut failed = 0;
    for (key, result) in keys.iter().zip(results) {
        if let Err(e) = result {
            failed += 1;
            tracing::warn!(key = %key, error = %e, "Failed to delete stored media");
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryMediaStore;

    #[tokio::test]
    async fn discard_removes_uploaded_objects() {
        let store = Arc::new(MemoryMediaStore::new("http://media.test"));
        store.put("unrelated", vec![0], "image/png").await.unwrap();

        let mut batch = UploadBatch::new(store.clone());
        batch.put("a", vec![1], "image/png").await.unwrap();
        batch.put("b", vec![2], "image/png").await.unwrap();
        assert_eq!(batch.len(), 2);

        assert_eq!(batch.discard().await, 0);
        assert_eq!(store.keys().await, vec!["unrelated".to_string()]);
    }

    #[tokio::test]
    async fn failed_put_is_not_tracked() {
        let store = Arc::new(MemoryMediaStore::failing_after("http://media.test", 1));
        let mut batch = UploadBatch::new(store.clone());
        batch.put("ok", vec![1], "image/png").await.unwrap();
        assert!(batch.put("boom", vec![2], "image/png").await.is_err());
        assert_eq!(batch.len(), 1);

        batch.discard().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn commit_keeps_objects() {
        let store = Arc::new(MemoryMediaStore::new("http://media.test"));
        let mut batch = UploadBatch::new(store.clone());
        batch.put("kept", vec![1], "video/mp4").await.unwrap();

        let kept = batch.commit();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "http://media.test/kept");
        assert!(store.contains("kept").await);
    }

    #[tokio::test]
    async fn purge_urls_skips_foreign_urls() {
        let store = MemoryMediaStore::new("http://media.test");
        let a = store.put("x/a.png", vec![1], "image/png").await.unwrap();
        store.put("x/b.png", vec![2], "image/png").await.unwrap();

        let failed = purge_urls(&store, [a.url.as_str(), "https://other.host/x/b.png"]).await;
        assert_eq!(failed, 0);
        assert_eq!(store.keys().await, vec!["x/b.png".to_string()]);
    }
}
