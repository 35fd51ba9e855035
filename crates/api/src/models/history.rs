//! Purchase history projection.

use serde::Serialize;

use farm_fresh_core::{CheckoutId, Rupiah};

use super::Checkout;

/// Summary row derived from a checkout. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub checkout_id: CheckoutId,
    /// Customer name.
    pub name: String,
    /// Number of lines in the item snapshot.
    pub total_item: usize,
    pub total_price: Rupiah,
    pub shipping_name: String,
    pub address: String,
}

impl From<&Checkout> for HistoryEntry {
    fn from(checkout: &Checkout) -> Self {
        let record = &checkout.record;
        Self {
            checkout_id: checkout.checkout_id.clone(),
            name: record.customer.name.clone(),
            total_item: record.items.len(),
            total_price: record.total,
            shipping_name: record.shipping.name.clone(),
            address: record.shipping.address.clone(),
        }
    }
}
