//! Cart service.
//!
//! Line totals are always recomputed from the product's current price, both
//! when listing and when writing, so a price change is reflected on the next
//! read. Adding a product that is already in the cart merges into the
//! existing line instead of creating a second one.
//!
//! There is no locking: two concurrent adds of the same product can both miss
//! the existing line and create duplicates.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use farm_fresh_core::{CartId, CartItemId, CurrencyError, ProductId, Quantity, Rupiah};

use crate::db::{CartRepository, DocumentStore, ProductRepository, RepositoryError};
use crate::models::{CartItem, CartItemRecord, CartLine, CartSummary, Product};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("item {0} not found in cart")]
    ItemNotFound(CartItemId),

    /// Clearing a cart that has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// A merged quantity or a computed total does not fit.
    #[error("quantity too large")]
    QuantityOverflow,

    /// A product's stored price cannot be parsed.
    #[error("product {product} has an invalid price: {source}")]
    InvalidStoredPrice {
        product: ProductId,
        #[source]
        source: CurrencyError,
    },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of adding a product to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created.
    Created(CartItem),
    /// The product was already in the cart and its quantity was increased.
    Merged(CartItem),
}

impl AddOutcome {
    #[must_use]
    pub const fn item(&self) -> &CartItem {
        match self {
            Self::Created(item) | Self::Merged(item) => item,
        }
    }
}

/// Cart service.
pub struct CartService<'a> {
    products: ProductRepository<'a>,
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            products: ProductRepository::new(store),
            carts: CartRepository::new(store),
        }
    }

    async fn product(&self, id: &ProductId) -> Result<Product, CartError> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| CartError::ProductNotFound(id.clone()))
    }

    fn line_total(product: &Product, quantity: Quantity) -> Result<Rupiah, CartError> {
        let unit = product
            .unit_price()
            .map_err(|source| CartError::InvalidStoredPrice {
                product: product.id.clone(),
                source,
            })?;
        unit.checked_mul(quantity).ok_or(CartError::QuantityOverflow)
    }

    /// List a cart with freshly computed line and grand totals.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if an item refers to a product
    /// that no longer exists.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn list_items(&self, cart_id: &CartId) -> Result<CartSummary, CartError> {
        let items = self.carts.list_items(cart_id).await?;

        let mut products: HashMap<ProductId, Product> = HashMap::new();
        let mut lines = Vec::with_capacity(items.len());
        for (item_id, record) in items {
            let product_id = record.product_id.clone();
            if !products.contains_key(&product_id) {
                let product = self.product(&product_id).await?;
                products.insert(product_id.clone(), product);
            }
            let Some(product) = products.get(&product_id) else {
                continue;
            };

            let total = Self::line_total(product, record.quantity)?;
            lines.push(CartLine::new(item_id, record, product, total));
        }

        CartSummary::new(lines).ok_or(CartError::QuantityOverflow)
    }

    /// Add a product, merging into an existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the product does not exist.
    #[instrument(skip(self), fields(cart_id = %cart_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<AddOutcome, CartError> {
        let product = self.product(product_id).await?;

        if let Some((existing_id, existing)) = self.carts.find_by_product(cart_id, product_id).await? {
            let merged = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow)?;
            let total = Self::line_total(&product, merged)?;

            self.carts
                .update_quantity(cart_id, &existing_id, merged, total)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => CartError::ItemNotFound(existing_id.clone()),
                    other => CartError::Repository(other),
                })?;

            tracing::debug!(item_id = %existing_id, quantity = %merged, "Merged into existing line");
            return Ok(AddOutcome::Merged(CartItem {
                id: existing_id,
                record: CartItemRecord {
                    quantity: merged,
                    ..existing
                },
                total_price: total,
            }));
        }

        let record = CartItemRecord {
            product_id: product_id.clone(),
            quantity,
            added_at: Utc::now(),
        };
        let total_price = Self::line_total(&product, quantity)?;
        let id = self.carts.insert_item(cart_id, &record, total_price).await?;

        tracing::debug!(item_id = %id, "Created cart line");
        Ok(AddOutcome::Created(CartItem {
            id,
            record,
            total_price,
        }))
    }

    /// Replace the quantity of a line and recompute its total.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line does not exist and
    /// `CartError::ProductNotFound` if its product was removed.
    #[instrument(skip(self), fields(cart_id = %cart_id, item_id = %item_id))]
    pub async fn update_item_quantity(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, CartError> {
        let (_, record) = self
            .carts
            .get_item(cart_id, item_id)
            .await?
            .ok_or_else(|| CartError::ItemNotFound(item_id.clone()))?;
        let product = self.product(&record.product_id).await?;
        let total = Self::line_total(&product, quantity)?;

        self.carts
            .update_quantity(cart_id, item_id, quantity, total)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::ItemNotFound(item_id.clone()),
                other => CartError::Repository(other),
            })?;

        Ok(CartItem {
            id: item_id.clone(),
            record: CartItemRecord { quantity, ..record },
            total_price: total,
        })
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line does not exist.
    #[instrument(skip(self), fields(cart_id = %cart_id, item_id = %item_id))]
    pub async fn remove_item(&self, cart_id: &CartId, item_id: &CartItemId) -> Result<(), CartError> {
        if self.carts.get_item(cart_id, item_id).await?.is_none() {
            return Err(CartError::ItemNotFound(item_id.clone()));
        }
        self.carts.delete_item(cart_id, item_id).await?;
        Ok(())
    }

    /// Remove every line in one atomic batch and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::EmptyCart` if the cart has no lines.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn clear_cart(&self, cart_id: &CartId) -> Result<usize, CartError> {
        let ids: Vec<CartItemId> = self
            .carts
            .list_items(cart_id)
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        if ids.is_empty() {
            return Err(CartError::EmptyCart);
        }

        self.remove_items(cart_id, &ids).await?;
        Ok(ids.len())
    }

    /// Remove specific lines in one atomic batch.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the batch fails.
    pub async fn remove_items(&self, cart_id: &CartId, item_ids: &[CartItemId]) -> Result<(), CartError> {
        self.carts.delete_items(cart_id, item_ids).await?;
        Ok(())
    }
}
