//! Authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::Identity;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Resolves the token's user and their cart, or rejects the request with
/// 401 (missing or invalid token) or 404 (unknown user).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(identity): RequireAuth) -> String {
///     format!("cart {}", identity.cart_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                AppError::BadRequest("Authorization header is not valid text".to_string())
            })?),
            None => None,
        };

        let identity = state.auth_service().authenticate(header).await?;

        set_sentry_user(&identity.user_id, None);
        tracing::Span::current().record("user_id", identity.user_id.as_str());

        Ok(Self(identity))
    }
}
