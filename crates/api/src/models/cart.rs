//! Cart line-item types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farm_fresh_core::{CartItemId, ProductId, Quantity, Rupiah};

use super::Product;

/// Decoded fields of `carts/{cartId}/items/{itemId}`.
///
/// The stored document also carries a `totalPrice` written alongside these
/// fields. It is never decoded: older writers formatted it differently, and
/// the total is always recomputed from the product's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRecord {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub added_at: DateTime<Utc>,
}

/// A cart line item with its document key and computed total.
///
/// Serializes as the stored document plus `id`, the shape returned by the
/// add and update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(flatten)]
    pub record: CartItemRecord,
    pub total_price: Rupiah,
}

/// Document written for a cart line: the record plus its cached total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredCartItem<'a> {
    #[serde(flatten)]
    pub record: &'a CartItemRecord,
    pub total_price: Rupiah,
}

/// A cart line joined with its product, as listed to the owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub added_at: DateTime<Utc>,
    pub name: String,
    /// Unit price exactly as stored on the product.
    pub price: String,
    pub total_price: Rupiah,
}

impl CartLine {
    /// Join an item with its product using a freshly computed total.
    #[must_use]
    pub fn new(
        item_id: CartItemId,
        record: CartItemRecord,
        product: &Product,
        total_price: Rupiah,
    ) -> Self {
        Self {
            item_id,
            product_id: record.product_id,
            quantity: record.quantity,
            added_at: record.added_at,
            name: product.name.clone(),
            price: product.price.clone(),
            total_price,
        }
    }
}

/// Every line of a cart plus the grand total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub cart_items: Vec<CartLine>,
    pub total_cart_price: Rupiah,
}

impl CartSummary {
    /// Build a summary whose grand total is the sum of the line totals.
    ///
    /// Returns `None` if the grand total overflows.
    #[must_use]
    pub fn new(cart_items: Vec<CartLine>) -> Option<Self> {
        let total_cart_price = Rupiah::checked_sum(cart_items.iter().map(|line| line.total_price))?;
        Some(Self {
            cart_items,
            total_cart_price,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_item_serializes_with_id() {
        let item = CartItem {
            id: CartItemId::new("i1"),
            record: CartItemRecord {
                product_id: ProductId::new("prod-A"),
                quantity: Quantity::new(3).unwrap(),
                added_at: "2024-05-01T08:00:00Z".parse().unwrap(),
            },
            total_price: Rupiah::from(30_000),
        };

        let body = serde_json::to_value(&item).unwrap();
        assert_eq!(
            body,
            json!({
                "id": "i1",
                "productId": "prod-A",
                "quantity": 3,
                "addedAt": "2024-05-01T08:00:00Z",
                "totalPrice": "Rp30.000"
            })
        );
    }

    #[test]
    fn test_stored_total_is_not_decoded() {
        for total in [json!("Rp1,234,567"), json!(null), json!(20000)] {
            let record: CartItemRecord = serde_json::from_value(json!({
                "productId": "prod-A",
                "quantity": 2,
                "addedAt": "2024-05-01T08:00:00.123Z",
                "totalPrice": total
            }))
            .unwrap();
            assert_eq!(record.quantity.get(), 2);
        }

        let without_total: CartItemRecord = serde_json::from_value(json!({
            "productId": "prod-A",
            "quantity": 1,
            "addedAt": "2024-05-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(without_total.product_id.as_str(), "prod-A");
    }

    #[test]
    fn test_stored_item_writes_total() {
        let record = CartItemRecord {
            product_id: ProductId::new("prod-A"),
            quantity: Quantity::new(2).unwrap(),
            added_at: "2024-05-01T08:00:00Z".parse().unwrap(),
        };
        let body = serde_json::to_value(StoredCartItem {
            record: &record,
            total_price: Rupiah::from(20_000),
        })
        .unwrap();
        assert_eq!(body["totalPrice"], "Rp20.000");
        assert_eq!(body["quantity"], 2);
    }

    #[test]
    fn test_empty_summary_total_is_zero() {
        let summary = CartSummary::new(Vec::new()).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.total_cart_price, Rupiah::ZERO);
    }
}
