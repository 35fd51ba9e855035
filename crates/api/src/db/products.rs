//! Product repository.

use farm_fresh_core::ProductId;

use super::{CollectionPath, DocumentStore, FieldFilter, RepositoryError};
use crate::models::product::{Product, ProductRecord};

const PRODUCTS: &str = "products";

/// Repository for `products/{productId}` documents.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    fn collection() -> CollectionPath {
        CollectionPath::root(PRODUCTS)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or the document is malformed.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let Some(doc) = self.store.get(&Self::collection(), id.as_str()).await? else {
            return Ok(None);
        };
        let record: ProductRecord = doc.decode()?;
        Ok(Some(Product::from_record(id.clone(), record)))
    }

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or a document is malformed.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.query(None).await
    }

    /// List products whose `type` equals `kind`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or a document is malformed.
    pub async fn list_by_type(&self, kind: &str) -> Result<Vec<Product>, RepositoryError> {
        self.query(Some(&FieldFilter::eq("type", kind))).await
    }

    async fn query(&self, filter: Option<&FieldFilter>) -> Result<Vec<Product>, RepositoryError> {
        let docs = self.store.query(&Self::collection(), filter).await?;
        docs.into_iter()
            .map(|doc| {
                let record: ProductRecord = doc.decode()?;
                Ok(Product::from_record(ProductId::new(doc.id), record))
            })
            .collect()
    }

    /// Create or replace a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    pub async fn upsert(&self, id: &ProductId, record: &ProductRecord) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(record)
            .map_err(|e| RepositoryError::DataCorruption(format!("unencodable product: {e}")))?;
        self.store.set(&Self::collection(), id.as_str(), data).await
    }
}
