//! Document persistence for the marketplace.
//!
//! All durable state is kept as JSON documents grouped into collections,
//! with one level of nesting for cart line items:
//!
//! ## Collections
//!
//! - `users/{userId}` - Profiles (owned by the identity service, read-only here)
//! - `products/{productId}` - Catalog entries
//! - `carts/{cartId}/items/{itemId}` - Cart line items
//! - `checkout/{checkoutId}` - Completed purchases
//!
//! ## Backends
//!
//! - [`postgres::PgDocumentStore`] - `documents` table with a JSONB payload
//! - [`memory::MemoryDocumentStore`] - process-local maps, selected with
//!   `FARMFRESH_DATABASE_URL=memory://` and used throughout the tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p farm-fresh-cli -- migrate
//! ```

pub mod carts;
pub mod checkouts;
pub mod farms;
pub mod memory;
pub mod postgres;
pub mod products;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use checkouts::CheckoutRepository;
pub use farms::FarmRepository;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Database URL that selects the in-memory backend.
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Length of generated document keys.
const DOCUMENT_ID_LENGTH: usize = 20;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// The backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Slash-separated path of a collection, e.g. `carts/abc/items`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// A top-level collection.
    #[must_use]
    pub fn root(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// A collection nested under a parent document.
    #[must_use]
    pub fn nested(parent: &str, parent_id: &str, name: &str) -> Self {
        Self(format!("{parent}/{parent_id}/{name}"))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored document: its key within the collection plus the JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Decode the payload into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RepositoryError> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            RepositoryError::DataCorruption(format!("document {} is malformed: {e}", self.id))
        })
    }
}

/// Equality filter on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    /// Match documents whose `field` equals `value`.
    #[must_use]
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    /// Whether a payload satisfies the filter.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// Per-collection document CRUD.
///
/// Implementations guarantee that `update` of a single document is atomic and
/// that `batch_delete` removes either every listed document or none of them.
/// `query` returns documents in creation order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Fetch one document by key.
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, RepositoryError>;

    /// List a collection, optionally filtered by one field.
    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<Document>, RepositoryError>;

    /// Insert a document under a generated key and return the key.
    async fn add(&self, collection: &CollectionPath, data: Value)
    -> Result<String, RepositoryError>;

    /// Create or overwrite a document under a known key.
    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Value,
    ) -> Result<(), RepositoryError>;

    /// Merge top-level fields of `patch` into an existing document.
    ///
    /// Returns `RepositoryError::NotFound` if the document does not exist.
    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        patch: Value,
    ) -> Result<(), RepositoryError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), RepositoryError>;

    /// Delete several documents of one collection atomically.
    async fn batch_delete(
        &self,
        collection: &CollectionPath,
        ids: &[String],
    ) -> Result<(), RepositoryError>;
}

/// Generate a random alphanumeric document key.
#[must_use]
pub fn generate_document_id() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(DOCUMENT_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Open the document store named by `database_url`.
///
/// # Errors
///
/// Returns `sqlx::Error` if a `PostgreSQL` pool cannot be created.
pub async fn connect(
    database_url: &secrecy::SecretString,
) -> Result<Arc<dyn DocumentStore>, sqlx::Error> {
    if database_url.expose_secret() == MEMORY_DATABASE_URL {
        tracing::warn!("Using in-memory document store; data will not survive a restart");
        return Ok(Arc::new(MemoryDocumentStore::new()));
    }

    let pool = create_pool(database_url).await?;
    Ok(Arc::new(PgDocumentStore::new(pool)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_collection_path() {
        let path = CollectionPath::nested("carts", "c1", "items");
        assert_eq!(path.as_str(), "carts/c1/items");
    }

    #[test]
    fn test_generated_ids_are_alphanumeric() {
        let id = generate_document_id();
        assert_eq!(id.len(), DOCUMENT_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_document_id());
    }

    #[test]
    fn test_field_filter_matches_top_level_field() {
        let filter = FieldFilter::eq("productId", "p1");
        assert!(filter.matches(&json!({ "productId": "p1", "quantity": 2 })));
        assert!(!filter.matches(&json!({ "productId": "p2" })));
        assert!(!filter.matches(&json!({ "quantity": 2 })));
    }

    #[test]
    fn test_decode_reports_document_id() {
        let doc = Document {
            id: "broken".to_owned(),
            data: json!({ "quantity": "many" }),
        };

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Record {
            quantity: u32,
        }

        let err = doc.decode::<Record>().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
