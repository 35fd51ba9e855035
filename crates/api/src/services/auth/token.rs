//! HS256 bearer token verification.
//!
//! Tokens are issued by the login service and carry the user's document key
//! in a `userId` claim. Expiry is always enforced.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use farm_fresh_core::UserId;

use super::AuthError;

/// Clock skew tolerated when checking `exp`, in seconds.
const LEEWAY_SECS: u64 = 30;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Expiry as a unix timestamp.
    pub exp: u64,
}

/// Verifies access tokens against the shared signing key.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("key", &"[REDACTED]")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Verify a token and return the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredential` if the signature, algorithm,
    /// expiry or claims are not acceptable.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const KEY: &str = "kR8#vL2qZ9!mW4tN7xB1@pF6hJ3cY0sD";

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn sign(claims: &serde_json::Value, key: &str, alg: Algorithm) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(&SecretString::from(KEY))
    }

    #[test]
    fn test_valid_token() {
        let token = sign(
            &serde_json::json!({ "userId": "u1", "username": "sari", "exp": now() + 3600 }),
            KEY,
            Algorithm::HS256,
        );
        let claims = verifier().verify(&token).unwrap();
        assert_eq!(claims.user_id, UserId::new("u1"));
        assert_eq!(claims.username.as_deref(), Some("sari"));
    }

    #[test]
    fn test_expired_token() {
        let token = sign(
            &serde_json::json!({ "userId": "u1", "exp": now() - 3600 }),
            KEY,
            Algorithm::HS256,
        );
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_wrong_key() {
        let token = sign(
            &serde_json::json!({ "userId": "u1", "exp": now() + 3600 }),
            "another-key-entirely-0123456789ab",
            Algorithm::HS256,
        );
        assert!(verifier().verify(&token).is_err());
    }

    #[test]
    fn test_wrong_algorithm() {
        let token = sign(
            &serde_json::json!({ "userId": "u1", "exp": now() + 3600 }),
            KEY,
            Algorithm::HS512,
        );
        assert!(verifier().verify(&token).is_err());
    }

    #[test]
    fn test_missing_exp() {
        let token = sign(&serde_json::json!({ "userId": "u1" }), KEY, Algorithm::HS256);
        assert!(verifier().verify(&token).is_err());
    }

    #[test]
    fn test_garbage() {
        assert!(verifier().verify("not.a.jwt").is_err());
    }
}
