//! Firebase Storage REST client.

use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use super::{BlobStore, StorageError, public_url};

/// Longest error body kept in `StorageError::Api`.
const MAX_ERROR_BODY: usize = 512;

/// Client for the Firebase Storage upload API.
#[derive(Clone)]
pub struct FirebaseStorageClient {
    client: Client,
    base_url: String,
    bucket: String,
    access_token: SecretString,
}

impl std::fmt::Debug for FirebaseStorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseStorageClient")
            .field("base_url", &self.base_url)
            .field("bucket", &self.bucket)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl FirebaseStorageClient {
    /// Create a new storage client.
    #[must_use]
    pub fn new(base_url: String, bucket: String, access_token: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            bucket,
            access_token,
        }
    }

    fn objects_url(&self) -> String {
        format!("{}/v0/b/{}/o", self.base_url, self.bucket)
    }

    async fn api_error(response: reqwest::Response) -> StorageError {
        let status = response.status().as_u16();
        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }
        StorageError::Api { status, message }
    }
}

#[async_trait::async_trait]
impl BlobStore for FirebaseStorageClient {
    fn backend(&self) -> &'static str {
        "firebase"
    }

    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let url = format!(
            "{}?uploadType=media&name={}",
            self.objects_url(),
            urlencoding::encode(name)
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::api_error(response).await;
            error!(error = %err, "Receipt upload rejected");
            return Err(err);
        }

        debug!("Receipt uploaded");
        Ok(public_url(&self.base_url, &self.bucket, name))
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let url = format!("{}/{}", self.objects_url(), urlencoding::encode(name));

        let response = self
            .client
            .delete(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        debug!("Object deleted");
        Ok(())
    }
}
