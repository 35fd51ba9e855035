//! User repository.
//!
//! Profiles are written by the external registration service. The API reads
//! them to resolve cart ids; `upsert` exists for seeding.

use farm_fresh_core::UserId;

use super::{CollectionPath, DocumentStore, RepositoryError};
use crate::models::user::{User, UserRecord};

const USERS: &str = "users";

/// Repository for `users/{userId}` documents.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    fn collection() -> CollectionPath {
        CollectionPath::root(USERS)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the profile cannot be decoded.
    pub async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let Some(doc) = self.store.get(&Self::collection(), id.as_str()).await? else {
            return Ok(None);
        };
        let record: UserRecord = doc.decode()?;
        Ok(Some(User::from_record(id.clone(), record)))
    }

    /// Create or replace a user profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    pub async fn upsert(&self, id: &UserId, record: &UserRecord) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(record)
            .map_err(|e| RepositoryError::DataCorruption(format!("unencodable user: {e}")))?;
        self.store.set(&Self::collection(), id.as_str(), data).await
    }
}
