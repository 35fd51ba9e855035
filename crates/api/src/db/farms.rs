//! Farm repository.

use farm_fresh_core::FarmId;

use super::{CollectionPath, DocumentStore, RepositoryError};
use crate::models::farm::{Farm, FarmRecord};

const FARMERS: &str = "farmers";

/// Repository for `farmers/{farmId}` documents.
pub struct FarmRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> FarmRepository<'a> {
    /// Create a new farm repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    fn collection() -> CollectionPath {
        CollectionPath::root(FARMERS)
    }

    /// Get a farm by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or the document is malformed.
    pub async fn get(&self, id: &FarmId) -> Result<Option<Farm>, RepositoryError> {
        let Some(doc) = self.store.get(&Self::collection(), id.as_str()).await? else {
            return Ok(None);
        };
        Ok(Some(Farm {
            id: id.clone(),
            record: doc.decode()?,
        }))
    }

    /// List every farm.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or a document is malformed.
    pub async fn list(&self) -> Result<Vec<Farm>, RepositoryError> {
        let docs = self.store.query(&Self::collection(), None).await?;
        docs.into_iter()
            .map(|doc| {
                Ok(Farm {
                    record: doc.decode()?,
                    id: FarmId::new(doc.id),
                })
            })
            .collect()
    }

    /// Create or replace a farm.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    pub async fn upsert(&self, id: &FarmId, record: &FarmRecord) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(record)
            .map_err(|e| RepositoryError::DataCorruption(format!("unencodable farm: {e}")))?;
        self.store.set(&Self::collection(), id.as_str(), data).await
    }
}
