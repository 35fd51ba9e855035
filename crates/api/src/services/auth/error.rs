//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header was sent.
    #[error("missing bearer token")]
    MissingCredential,

    /// The token is malformed, badly signed, or expired.
    #[error("invalid token: {0}")]
    InvalidCredential(#[from] jsonwebtoken::errors::Error),

    /// The token's subject has no profile.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
