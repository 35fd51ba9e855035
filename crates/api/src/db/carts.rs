//! Cart line-item repository.
//!
//! Items of a cart live in the nested collection `carts/{cartId}/items`.

use serde_json::json;

use farm_fresh_core::{CartId, CartItemId, ProductId, Quantity, Rupiah};

use super::{CollectionPath, Document, DocumentStore, FieldFilter, RepositoryError};
use crate::models::cart::{CartItemRecord, StoredCartItem};

const CARTS: &str = "carts";
const ITEMS: &str = "items";

/// Repository for the items of a cart.
pub struct CartRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    fn items(cart_id: &CartId) -> CollectionPath {
        CollectionPath::nested(CARTS, cart_id.as_str(), ITEMS)
    }

    fn to_item(doc: &Document) -> Result<(CartItemId, CartItemRecord), RepositoryError> {
        Ok((CartItemId::new(doc.id.as_str()), doc.decode()?))
    }

    /// List every item in a cart, oldest first.
    ///
    /// The cached `totalPrice` of each document is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or an item is malformed.
    pub async fn list_items(
        &self,
        cart_id: &CartId,
    ) -> Result<Vec<(CartItemId, CartItemRecord)>, RepositoryError> {
        let docs = self.store.query(&Self::items(cart_id), None).await?;
        docs.iter().map(Self::to_item).collect()
    }

    /// Get one item of a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or the item is malformed.
    pub async fn get_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<Option<(CartItemId, CartItemRecord)>, RepositoryError> {
        self.store
            .get(&Self::items(cart_id), item_id.as_str())
            .await?
            .as_ref()
            .map(Self::to_item)
            .transpose()
    }

    /// Find the item holding `product_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or an item is malformed.
    pub async fn find_by_product(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
    ) -> Result<Option<(CartItemId, CartItemRecord)>, RepositoryError> {
        let filter = FieldFilter::eq("productId", product_id.as_str());
        let docs = self.store.query(&Self::items(cart_id), Some(&filter)).await?;
        docs.first().map(Self::to_item).transpose()
    }

    /// Insert a new item with its cached total under a generated key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    pub async fn insert_item(
        &self,
        cart_id: &CartId,
        record: &CartItemRecord,
        total_price: Rupiah,
    ) -> Result<CartItemId, RepositoryError> {
        let data = serde_json::to_value(StoredCartItem {
            record,
            total_price,
        })
        .map_err(|e| RepositoryError::DataCorruption(format!("unencodable cart item: {e}")))?;
        let id = self.store.add(&Self::items(cart_id), data).await?;
        Ok(CartItemId::new(id))
    }

    /// Set the quantity and cached total of an existing item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item no longer exists.
    pub async fn update_quantity(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: Quantity,
        total_price: Rupiah,
    ) -> Result<(), RepositoryError> {
        let patch = json!({
            "quantity": quantity,
            "totalPrice": total_price,
        });
        self.store
            .update(&Self::items(cart_id), item_id.as_str(), patch)
            .await
    }

    /// Delete one item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    pub async fn delete_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<(), RepositoryError> {
        self.store
            .delete(&Self::items(cart_id), item_id.as_str())
            .await
    }

    /// Delete several items in one atomic batch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the batch fails; no item is deleted then.
    pub async fn delete_items(
        &self,
        cart_id: &CartId,
        item_ids: &[CartItemId],
    ) -> Result<(), RepositoryError> {
        let ids: Vec<String> = item_ids.iter().map(|id| id.as_str().to_owned()).collect();
        self.store.batch_delete(&Self::items(cart_id), &ids).await
    }
}
