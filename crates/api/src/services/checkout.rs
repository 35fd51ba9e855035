//! Checkout service.
//!
//! Creating a checkout is a saga over three independent writes:
//!
//! 1. upload the receipt image;
//! 2. write the checkout document, deleting the uploaded receipt again if
//!    this fails;
//! 3. clear the purchased cart lines. A failure here leaves an orphaned cart
//!    that is logged, and the checkout still succeeds.
//!
//! Edits and deletes are restricted to the user who placed the checkout.
//! Reads by id follow the configured [`CheckoutReadPolicy`].

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use farm_fresh_core::{CartItemId, CheckoutId, Rupiah, UserId};

use super::auth::Identity;
use super::cart::{CartError, CartService};
use crate::db::{CheckoutRepository, DocumentStore, RepositoryError};
use crate::models::{Checkout, CheckoutRecord, CustomerInfo, ShippingInfo};
use crate::storage::{BlobStore, StorageError, StoredObject, Upload};

/// Who may read a checkout by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutReadPolicy {
    /// Any authenticated user.
    #[default]
    AnyUser,
    /// Only the user who placed it.
    OwnerOnly,
}

impl FromStr for CheckoutReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any-user" => Ok(Self::AnyUser),
            "owner-only" => Ok(Self::OwnerOnly),
            other => Err(format!(
                "unknown read policy {other:?}, expected any-user or owner-only"
            )),
        }
    }
}

impl fmt::Display for CheckoutReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AnyUser => "any-user",
            Self::OwnerOnly => "owner-only",
        })
    }
}

/// Errors that can occur during checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("checkout {0} not found")]
    NotFound(CheckoutId),

    /// Client-supplied items without a total to go with them.
    #[error("total is required when items are supplied")]
    MissingTotal,

    /// The requester does not own the checkout.
    #[error("not allowed to access checkout {0}")]
    Forbidden(CheckoutId),

    #[error("receipt storage failed: {0}")]
    Receipt(#[from] StorageError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Fields submitted with a new checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutDraft {
    pub customer: CustomerInfo,
    pub shipping: ShippingInfo,
    /// Purchased lines; the caller's cart is snapshotted when absent.
    pub items: Option<Vec<Value>>,
    /// Order total. Required with `items`; defaults to the snapshot's total.
    pub total: Option<Rupiah>,
}

/// Owner edits to an existing checkout. Absent fields are left unchanged;
/// present ones replace the stored value wholesale.
#[derive(Debug, Clone, Default)]
pub struct CheckoutChanges {
    pub customer: Option<CustomerInfo>,
    pub shipping: Option<ShippingInfo>,
    pub items: Option<Vec<Value>>,
    pub total: Option<Rupiah>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub checkout: Checkout,
    /// `false` if the purchased lines could not be removed from the cart.
    pub cart_cleared: bool,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    checkouts: CheckoutRepository<'a>,
    cart: CartService<'a>,
    blobs: &'a dyn BlobStore,
    read_policy: CheckoutReadPolicy,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(
        store: &'a dyn DocumentStore,
        blobs: &'a dyn BlobStore,
        read_policy: CheckoutReadPolicy,
    ) -> Self {
        Self {
            checkouts: CheckoutRepository::new(store),
            cart: CartService::new(store),
            blobs,
            read_policy,
        }
    }

    /// List the checkouts placed by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the read fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Checkout>, CheckoutError> {
        Ok(self.checkouts.list_for_user(user_id).await?)
    }

    /// List every checkout.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the read fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Checkout>, CheckoutError> {
        Ok(self.checkouts.list_all().await?)
    }

    async fn find(&self, id: &CheckoutId) -> Result<Checkout, CheckoutError> {
        self.checkouts
            .get(id)
            .await?
            .ok_or_else(|| CheckoutError::NotFound(id.clone()))
    }

    async fn find_owned(&self, id: &CheckoutId, requester: &UserId) -> Result<Checkout, CheckoutError> {
        let checkout = self.find(id).await?;
        if !checkout.is_owned_by(requester) {
            tracing::warn!(checkout_id = %id, requester = %requester, "Checkout ownership mismatch");
            return Err(CheckoutError::Forbidden(id.clone()));
        }
        Ok(checkout)
    }

    /// Get one checkout, subject to the read policy.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotFound` if it does not exist and
    /// `CheckoutError::Forbidden` if the policy denies the requester.
    #[instrument(skip(self), fields(checkout_id = %id, policy = %self.read_policy))]
    pub async fn get(&self, id: &CheckoutId, requester: &UserId) -> Result<Checkout, CheckoutError> {
        match self.read_policy {
            CheckoutReadPolicy::AnyUser => self.find(id).await,
            CheckoutReadPolicy::OwnerOnly => self.find_owned(id, requester).await,
        }
    }

    /// Place a checkout for the caller.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingTotal` if items are supplied without a
    /// total, `CheckoutError::Cart` if the cart has to be snapshotted and is
    /// empty or unreadable, `CheckoutError::Receipt` if the upload fails, and
    /// `CheckoutError::Repository` if the checkout cannot be written.
    #[instrument(skip(self, draft, receipt), fields(user_id = %identity.user_id, cart_id = %identity.cart_id))]
    pub async fn create(
        &self,
        identity: &Identity,
        draft: CheckoutDraft,
        receipt: &Upload,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let CheckoutDraft {
            customer,
            shipping,
            items,
            total,
        } = draft;

        let mut purchased: Option<Vec<CartItemId>> = None;
        let (items, total) = match (items, total) {
            (Some(items), Some(total)) => (items, total),
            (Some(_), None) => return Err(CheckoutError::MissingTotal),
            (None, total) => {
                let summary = self.cart.list_items(&identity.cart_id).await?;
                if summary.is_empty() {
                    return Err(CartError::EmptyCart.into());
                }
                purchased = Some(summary.cart_items.iter().map(|l| l.item_id.clone()).collect());
                let items = summary
                    .cart_items
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<_, _>>()
                    .map_err(|e| {
                        RepositoryError::DataCorruption(format!("unencodable cart line: {e}"))
                    })?;
                (items, total.unwrap_or(summary.total_cart_price))
            }
        };

        let stored = self.blobs.store(receipt).await?;
        tracing::debug!(object = %stored.name, "Receipt stored");

        let record = CheckoutRecord {
            user_id: identity.user_id.clone(),
            customer,
            shipping,
            items,
            total,
            checkout_date: Utc::now(),
            image: stored.url.clone(),
            updated_at: None,
        };

        let checkout = match self.checkouts.insert(record).await {
            Ok(checkout) => checkout,
            Err(e) => {
                self.discard_receipt(&stored).await;
                return Err(e.into());
            }
        };

        let cart_cleared = self.clear_purchased(identity, purchased.as_deref()).await;

        tracing::info!(
            checkout_id = %checkout.checkout_id,
            total = %checkout.record.total,
            cart_cleared,
            "Checkout created"
        );

        Ok(CheckoutOutcome {
            checkout,
            cart_cleared,
        })
    }

    /// Remove purchased lines, or the whole cart when the client supplied
    /// its own item list.
    async fn clear_purchased(&self, identity: &Identity, purchased: Option<&[CartItemId]>) -> bool {
        let result = match purchased {
            Some(ids) => self.cart.remove_items(&identity.cart_id, ids).await,
            None => self.cart.clear_cart(&identity.cart_id).await.map(|_| ()),
        };

        match result {
            Ok(()) | Err(CartError::EmptyCart) => true,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id = %identity.user_id,
                    cart_id = %identity.cart_id,
                    "Checkout written but cart was not cleared; cart is orphaned"
                );
                false
            }
        }
    }

    async fn discard_receipt(&self, stored: &StoredObject) {
        match self.blobs.delete(&stored.name).await {
            Ok(()) => tracing::warn!(object = %stored.name, "Checkout write failed; receipt removed"),
            Err(e) => tracing::error!(
                error = %e,
                object = %stored.name,
                "Checkout write failed and receipt could not be removed"
            ),
        }
    }

    /// Edit a checkout owned by `requester`.
    ///
    /// The creation date is kept and `updatedAt` is set. A new receipt
    /// replaces the image URL; the previous object is left in the bucket.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotFound` if it does not exist,
    /// `CheckoutError::Forbidden` if the requester is not the owner, and
    /// `CheckoutError::Receipt` if the new receipt cannot be stored.
    #[instrument(skip(self, changes, receipt), fields(checkout_id = %id, requester = %requester))]
    pub async fn update(
        &self,
        id: &CheckoutId,
        requester: &UserId,
        changes: CheckoutChanges,
        receipt: Option<&Upload>,
    ) -> Result<Checkout, CheckoutError> {
        let existing = self.find_owned(id, requester).await?;

        let stored = match receipt {
            Some(upload) => Some(self.blobs.store(upload).await?),
            None => None,
        };

        let current = existing.record;
        let record = CheckoutRecord {
            user_id: current.user_id,
            customer: changes.customer.unwrap_or(current.customer),
            shipping: changes.shipping.unwrap_or(current.shipping),
            items: changes.items.unwrap_or(current.items),
            total: changes.total.unwrap_or(current.total),
            checkout_date: current.checkout_date,
            image: stored.as_ref().map_or(current.image, |s| s.url.clone()),
            updated_at: Some(Utc::now()),
        };

        if let Err(e) = self.checkouts.replace(id, &record).await {
            if let Some(stored) = &stored {
                self.discard_receipt(stored).await;
            }
            return Err(match e {
                RepositoryError::NotFound => CheckoutError::NotFound(id.clone()),
                other => other.into(),
            });
        }

        Ok(Checkout {
            checkout_id: id.clone(),
            record,
        })
    }

    /// Delete a checkout owned by `requester`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotFound` if it does not exist and
    /// `CheckoutError::Forbidden` if the requester is not the owner.
    #[instrument(skip(self), fields(checkout_id = %id, requester = %requester))]
    pub async fn delete(&self, id: &CheckoutId, requester: &UserId) -> Result<(), CheckoutError> {
        self.find_owned(id, requester).await?;
        self.checkouts.delete(id).await?;
        Ok(())
    }
}
