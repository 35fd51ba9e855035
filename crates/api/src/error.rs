//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Service errors convert into
//! `AppError` with `?`; the conversion to a response picks the status code,
//! reports server errors to Sentry, and renders `{"error": "<message>"}`.
//! Details of server errors never reach the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use farm_fresh_core::{CurrencyError, QuantityError};

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::checkout::CheckoutError;
use crate::services::history::HistoryError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// History read failed.
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upload larger than the configured cap.
    #[error("Payload too large (limit {0} bytes)")]
    PayloadTooLarge(usize),
}

impl AppError {
    /// Status code and client-facing message.
    fn classify(&self) -> (StatusCode, String) {
        let internal = || (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string());

        match self {
            Self::Auth(err) => match err {
                AuthError::MissingCredential => {
                    (StatusCode::UNAUTHORIZED, "Missing bearer token".to_string())
                }
                AuthError::InvalidCredential(_) => {
                    (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string())
                }
                AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
                AuthError::Repository(_) => internal(),
            },
            Self::Cart(err) => classify_cart(err).unwrap_or_else(internal),
            Self::Checkout(err) => match err {
                CheckoutError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "Checkout not found".to_string())
                }
                CheckoutError::MissingTotal => (
                    StatusCode::BAD_REQUEST,
                    "total is required when items are supplied".to_string(),
                ),
                CheckoutError::Forbidden(_) => (
                    StatusCode::FORBIDDEN,
                    "Not allowed to access this checkout".to_string(),
                ),
                CheckoutError::Cart(err) => classify_cart(err).unwrap_or_else(internal),
                CheckoutError::Receipt(_) | CheckoutError::Repository(_) => internal(),
            },
            Self::History(err) => match err {
                HistoryError::NoHistory => {
                    (StatusCode::NOT_FOUND, "No checkout history found".to_string())
                }
                HistoryError::Repository(_) => internal(),
            },
            Self::Database(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            Self::Database(_) => internal(),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Upload exceeds the {limit} byte limit"),
            ),
        }
    }
}

/// Client-facing mapping of cart errors; `None` for server errors.
fn classify_cart(err: &CartError) -> Option<(StatusCode, String)> {
    match err {
        CartError::ProductNotFound(_) => {
            Some((StatusCode::NOT_FOUND, "Product not found".to_string()))
        }
        CartError::ItemNotFound(_) => {
            Some((StatusCode::NOT_FOUND, "Item not found in cart".to_string()))
        }
        CartError::EmptyCart => Some((StatusCode::NOT_FOUND, "Cart is empty".to_string())),
        CartError::QuantityOverflow => {
            Some((StatusCode::BAD_REQUEST, "Quantity is too large".to_string()))
        }
        CartError::InvalidStoredPrice { .. } | CartError::Repository(_) => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.classify();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QuantityError> for AppError {
    fn from(err: QuantityError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
