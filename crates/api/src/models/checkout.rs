//! Checkout (order) types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use farm_fresh_core::{CheckoutId, Rupiah, UserId};

/// Buyer details. Only `name` is interpreted; other fields pass through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Delivery details. Only `name` and `address` are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored shape of `checkout/{checkoutId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRecord {
    pub user_id: UserId,
    pub customer: CustomerInfo,
    pub shipping: ShippingInfo,
    /// Snapshot of the purchased lines, copied when the checkout is written.
    #[serde(default)]
    pub items: Vec<Value>,
    pub total: Rupiah,
    /// Creation time, assigned by the server.
    pub checkout_date: DateTime<Utc>,
    /// Public URL of the payment receipt.
    pub image: String,
    /// Time of the last owner edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A checkout with its document key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub checkout_id: CheckoutId,
    #[serde(flatten)]
    pub record: CheckoutRecord,
}

impl Checkout {
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.record.user_id == user_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checkout_wire_shape() {
        let record: CheckoutRecord = serde_json::from_value(json!({
            "userId": "u1",
            "customer": { "name": "Sari", "phone": "0812" },
            "shipping": { "name": "JNE", "address": "Jl. Mawar 1" },
            "items": [{ "productId": "prod-A", "quantity": 2 }],
            "total": 50000,
            "checkoutDate": "2024-05-01T08:00:00Z",
            "image": "https://example.test/r.png"
        }))
        .unwrap();
        let checkout = Checkout {
            checkout_id: CheckoutId::new("ck1"),
            record,
        };

        let body = serde_json::to_value(&checkout).unwrap();
        assert_eq!(body["checkoutId"], "ck1");
        assert_eq!(body["userId"], "u1");
        assert_eq!(body["total"], "Rp50.000");
        assert_eq!(body["customer"]["phone"], "0812");
        assert!(body.get("updatedAt").is_none());
        assert!(checkout.is_owned_by(&UserId::new("u1")));
        assert!(!checkout.is_owned_by(&UserId::new("u2")));
    }
}
