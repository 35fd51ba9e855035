//! Receipt image storage.
//!
//! Uploaded files are written to an object bucket and referenced from
//! checkouts by public URL. Objects are named `{unixMillis}_{fileName}`.
//!
//! ## Backends
//!
//! - [`FirebaseStorageClient`] - Firebase Storage REST API (production)
//! - [`MemoryBlobStore`] - process-local map, used when no access token is
//!   configured and in tests

pub mod error;
pub mod firebase;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use error::StorageError;
pub use firebase::FirebaseStorageClient;
pub use memory::MemoryBlobStore;

use crate::config::StorageConfig;

/// Name used when a client uploads a file without one.
const FALLBACK_FILE_NAME: &str = "upload";

/// A file received from a client, fully buffered.
#[derive(Clone)]
pub struct Upload {
    /// File name as sent by the client.
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// An object written to the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object name within the bucket.
    pub name: String,
    /// Public download URL.
    pub url: String,
}

/// Object storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Write an object and return its public URL.
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError>;

    /// Remove an object. Removing a missing object is not an error.
    async fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// Store a client upload under a timestamped name.
    async fn store(&self, upload: &Upload) -> Result<StoredObject, StorageError> {
        let name = object_name(&upload.file_name, Utc::now());
        let url = self
            .put(&name, &upload.content_type, upload.bytes.clone())
            .await?;
        Ok(StoredObject { name, url })
    }
}

/// Object name for an upload received at `received_at`.
///
/// Any directory part of the client-supplied name is dropped so objects
/// never nest.
#[must_use]
pub fn object_name(file_name: &str, received_at: DateTime<Utc>) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_FILE_NAME);
    format!("{}_{base}", received_at.timestamp_millis())
}

/// Public download URL of an object.
#[must_use]
pub fn public_url(base_url: &str, bucket: &str, name: &str) -> String {
    format!(
        "{}/v0/b/{bucket}/o/{}?alt=media",
        base_url.trim_end_matches('/'),
        urlencoding::encode(name)
    )
}

/// Build the blob store described by `config`.
///
/// Without an access token the in-memory store is used.
#[must_use]
pub fn from_config(config: &StorageConfig) -> Arc<dyn BlobStore> {
    match &config.access_token {
        Some(token) => Arc::new(FirebaseStorageClient::new(
            config.base_url.clone(),
            config.bucket.clone(),
            token.clone(),
        )),
        None => {
            tracing::warn!(
                bucket = %config.bucket,
                "STORAGE_ACCESS_TOKEN not set, receipts are kept in memory"
            );
            Arc::new(MemoryBlobStore::new(config.base_url.clone(), config.bucket.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
    }

    #[test]
    fn test_object_name() {
        assert_eq!(
            object_name("receipt.png", at(1_714_550_400_123)),
            "1714550400123_receipt.png"
        );
    }

    #[test]
    fn test_object_name_strips_directories() {
        assert_eq!(object_name("../../etc/passwd", at(5)), "5_passwd");
        assert_eq!(object_name("C:\\Users\\x\\bon.jpg", at(5)), "5_bon.jpg");
        assert_eq!(object_name("", at(5)), "5_upload");
    }

    #[test]
    fn test_public_url_encodes_name() {
        assert_eq!(
            public_url(
                "https://firebasestorage.googleapis.com/",
                "farm-fresh.appspot.com",
                "1_my receipt.png"
            ),
            "https://firebasestorage.googleapis.com/v0/b/farm-fresh.appspot.com/o/1_my%20receipt.png?alt=media"
        );
    }
}
