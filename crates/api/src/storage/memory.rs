//! In-memory blob store.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use super::{BlobStore, StorageError, public_url};

#[derive(Debug, Clone)]
struct StoredBlob {
    content_type: String,
    bytes: Bytes,
}

/// Blob store keeping objects in a process-local map.
///
/// URLs use the same layout as the Firebase backend so stored checkouts look
/// identical either way.
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    bucket: String,
    objects: Mutex<HashMap<String, StoredBlob>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new(base_url: String, bucket: String) -> Self {
        Self {
            base_url,
            bucket,
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Names of all stored objects, sorted.
    pub async fn object_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Content type and bytes of one object.
    pub async fn object(&self, name: &str) -> Option<(String, Bytes)> {
        self.objects
            .lock()
            .await
            .get(name)
            .map(|blob| (blob.content_type.clone(), blob.bytes.clone()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        self.objects.lock().await.insert(
            name.to_owned(),
            StoredBlob {
                content_type: content_type.to_owned(),
                bytes,
            },
        );
        Ok(public_url(&self.base_url, &self.bucket, name))
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        self.objects.lock().await.remove(name);
        Ok(())
    }
}
