//! User domain types.
//!
//! Users are created by the external registration service; this API only
//! reads them to find the cart that belongs to a token's subject.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use farm_fresh_core::{CartId, UserId};

/// Stored shape of `users/{userId}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Cart assigned at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<CartId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Remaining profile fields, preserved untouched.
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// A marketplace user (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Document key of the user.
    pub id: UserId,
    /// The user's single cart.
    pub cart_id: CartId,
    /// Login name, if the profile has one.
    pub username: Option<String>,
    /// Display name, if the profile has one.
    pub name: Option<String>,
}

impl User {
    /// Build the domain type from a stored record.
    ///
    /// Registration historically assigned the user id as the cart id, so a
    /// profile without `cartId` falls back to it.
    #[must_use]
    pub fn from_record(id: UserId, record: UserRecord) -> Self {
        let cart_id = record
            .cart_id
            .unwrap_or_else(|| CartId::new(id.as_str()));
        Self {
            id,
            cart_id,
            username: record.username,
            name: record.name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_id_defaults_to_user_id() {
        let record: UserRecord = serde_json::from_value(json!({ "username": "sari" })).unwrap();
        let user = User::from_record(UserId::new("u1"), record);
        assert_eq!(user.cart_id.as_str(), "u1");
        assert_eq!(user.username.as_deref(), Some("sari"));
    }

    #[test]
    fn test_extra_profile_fields_are_kept() {
        let record: UserRecord = serde_json::from_value(json!({
            "cartId": "c9",
            "phone": "0812"
        }))
        .unwrap();
        assert_eq!(record.cart_id, Some(CartId::new("c9")));
        assert_eq!(record.profile["phone"], "0812");
    }
}
