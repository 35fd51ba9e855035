//! Product catalog types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use farm_fresh_core::{CurrencyError, ProductId, Rupiah};

/// Stored shape of `products/{productId}`.
///
/// `price` is kept as the display string it was written with; it is parsed
/// whenever a total is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rate: Value,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A catalog entry as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "idProduct")]
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub price: String,
    pub description: String,
    pub rate: Value,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Product {
    #[must_use]
    pub fn from_record(id: ProductId, record: ProductRecord) -> Self {
        Self {
            id,
            name: record.name,
            image: record.image,
            price: record.price,
            description: record.description,
            rate: record.rate,
            category: record.category,
            kind: record.kind,
        }
    }

    /// Parse the stored display price.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError` if the stored price is not a valid amount.
    pub fn unit_price(&self) -> Result<Rupiah, CurrencyError> {
        Rupiah::parse(&self.price)
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            image: product.image,
            price: product.price,
            description: product.description,
            rate: product.rate,
            category: product.category,
            kind: product.kind,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_wire_shape() {
        let record: ProductRecord = serde_json::from_value(json!({
            "name": "Tomat",
            "price": "Rp10.000",
            "type": "sayur",
            "rate": 4.5
        }))
        .unwrap();
        let product = Product::from_record(ProductId::new("prod-A"), record);

        let body = serde_json::to_value(&product).unwrap();
        assert_eq!(body["idProduct"], "prod-A");
        assert_eq!(body["type"], "sayur");
        assert_eq!(body["rate"], 4.5);
        assert_eq!(body["image"], "");
        assert_eq!(product.unit_price().unwrap(), Rupiah::from(10_000));
    }
}
