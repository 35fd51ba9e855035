//! Checkout repository.

use farm_fresh_core::{CheckoutId, UserId};

use super::{CollectionPath, Document, DocumentStore, FieldFilter, RepositoryError};
use crate::models::checkout::{Checkout, CheckoutRecord};

const CHECKOUT: &str = "checkout";

/// Repository for `checkout/{checkoutId}` documents.
pub struct CheckoutRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CheckoutRepository<'a> {
    /// Create a new checkout repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    fn collection() -> CollectionPath {
        CollectionPath::root(CHECKOUT)
    }

    fn to_checkout(doc: &Document) -> Result<Checkout, RepositoryError> {
        Ok(Checkout {
            checkout_id: CheckoutId::new(doc.id.as_str()),
            record: doc.decode()?,
        })
    }

    fn encode(record: &CheckoutRecord) -> Result<serde_json::Value, RepositoryError> {
        serde_json::to_value(record)
            .map_err(|e| RepositoryError::DataCorruption(format!("unencodable checkout: {e}")))
    }

    /// List the checkouts placed by one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or a document is malformed.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Checkout>, RepositoryError> {
        let filter = FieldFilter::eq("userId", user_id.as_str());
        let docs = self.store.query(&Self::collection(), Some(&filter)).await?;
        docs.iter().map(Self::to_checkout).collect()
    }

    /// List every checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or a document is malformed.
    pub async fn list_all(&self) -> Result<Vec<Checkout>, RepositoryError> {
        let docs = self.store.query(&Self::collection(), None).await?;
        docs.iter().map(Self::to_checkout).collect()
    }

    /// Get a checkout by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or the document is malformed.
    pub async fn get(&self, id: &CheckoutId) -> Result<Option<Checkout>, RepositoryError> {
        self.store
            .get(&Self::collection(), id.as_str())
            .await?
            .as_ref()
            .map(Self::to_checkout)
            .transpose()
    }

    /// Insert a new checkout under a generated key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    pub async fn insert(&self, record: CheckoutRecord) -> Result<Checkout, RepositoryError> {
        let data = Self::encode(&record)?;
        let id = self.store.add(&Self::collection(), data).await?;
        Ok(Checkout {
            checkout_id: CheckoutId::new(id),
            record,
        })
    }

    /// Overwrite the fields of an existing checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the checkout no longer exists.
    pub async fn replace(&self, id: &CheckoutId, record: &CheckoutRecord) -> Result<(), RepositoryError> {
        let data = Self::encode(record)?;
        self.store.update(&Self::collection(), id.as_str(), data).await
    }

    /// Delete a checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    pub async fn delete(&self, id: &CheckoutId) -> Result<(), RepositoryError> {
        self.store.delete(&Self::collection(), id.as_str()).await
    }
}
