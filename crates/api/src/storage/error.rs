//! Storage errors.

use thiserror::Error;

/// Errors that can occur when talking to object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("storage request failed: {0}")]
    Request(String),

    /// The storage API rejected the request.
    #[error("storage API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the API.
        status: u16,
        /// Response body, truncated.
        message: String,
    },
}
