//! Authentication service.
//!
//! Turns an `Authorization` header into an [`Identity`]: the token's user plus
//! the cart assigned to them at registration.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenVerifier};

use std::time::Duration;

use moka::future::Cache;
use tracing::instrument;

use farm_fresh_core::{CartId, UserId};

use crate::db::{DocumentStore, UserRepository};

/// Cart ids never change after registration, so lookups are cached briefly.
const CART_ID_TTL: Duration = Duration::from_secs(60);
const CART_ID_CACHE_CAPACITY: u64 = 10_000;

/// User to cart id lookups.
pub type CartIdCache = Cache<UserId, CartId>;

/// Build an empty cart id cache.
#[must_use]
pub fn cart_id_cache() -> CartIdCache {
    Cache::builder()
        .max_capacity(CART_ID_CACHE_CAPACITY)
        .time_to_live(CART_ID_TTL)
        .build()
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub cart_id: CartId,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenVerifier,
    cart_ids: &'a CartIdCache,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        store: &'a dyn DocumentStore,
        tokens: &'a TokenVerifier,
        cart_ids: &'a CartIdCache,
    ) -> Self {
        Self {
            users: UserRepository::new(store),
            tokens,
            cart_ids,
        }
    }

    /// Authenticate an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredential` if no header was sent,
    /// `AuthError::InvalidCredential` if the token does not verify, and
    /// `AuthError::UserNotFound` if the token's user has no profile.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.tokens.verify(token)?;
        self.resolve(claims.user_id).await
    }

    /// Look up the cart of a known user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user has no profile.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn resolve(&self, user_id: UserId) -> Result<Identity, AuthError> {
        if let Some(cart_id) = self.cart_ids.get(&user_id).await {
            return Ok(Identity { user_id, cart_id });
        }

        let user = self
            .users
            .get_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.cart_ids
            .insert(user_id.clone(), user.cart_id.clone())
            .await;

        Ok(Identity {
            user_id,
            cart_id: user.cart_id,
        })
    }
}

/// Extract the token from a header value.
///
/// The `Bearer` scheme is matched case-insensitively; a bare token is
/// accepted as-is, as older clients send it without a scheme.
fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingCredential)?;

    let token = match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => value,
    };

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;
    use crate::models::UserRecord;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use secrecy::SecretString;

    const KEY: &str = "kR8#vL2qZ9!mW4tN7xB1@pF6hJ3cY0sD";

    fn token_for(user: &str) -> String {
        let exp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        encode(
            &Header::default(),
            &serde_json::json!({ "userId": user, "exp": exp }),
            &EncodingKey::from_secret(KEY.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(Some("bearer  abc ")).unwrap(), "abc");
        assert_eq!(bearer_token(Some("abc")).unwrap(), "abc");
        assert!(matches!(
            bearer_token(None),
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer ")),
            Err(AuthError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_resolves_cart() {
        let store = MemoryDocumentStore::new();
        UserRepository::new(&store)
            .upsert(
                &UserId::new("u1"),
                &UserRecord {
                    cart_id: Some(CartId::new("cart-1")),
                    ..UserRecord::default()
                },
            )
            .await
            .unwrap();
        let tokens = TokenVerifier::new(&SecretString::from(KEY));
        let cache = cart_id_cache();
        let auth = AuthService::new(&store, &tokens, &cache);

        let header = format!("Bearer {}", token_for("u1"));
        let identity = auth.authenticate(Some(&header)).await.unwrap();

        assert_eq!(identity.user_id, UserId::new("u1"));
        assert_eq!(identity.cart_id, CartId::new("cart-1"));
        assert_eq!(
            cache.get(&UserId::new("u1")).await,
            Some(CartId::new("cart-1"))
        );
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let store = MemoryDocumentStore::new();
        let tokens = TokenVerifier::new(&SecretString::from(KEY));
        let cache = cart_id_cache();
        let auth = AuthService::new(&store, &tokens, &cache);

        let header = format!("Bearer {}", token_for("ghost"));
        assert!(matches!(
            auth.authenticate(Some(&header)).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
