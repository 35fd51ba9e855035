//! History service.
//!
//! A read-only projection of every checkout into summary rows. History is
//! public and not filtered by caller.

use thiserror::Error;
use tracing::instrument;

use crate::db::{CheckoutRepository, DocumentStore, RepositoryError};
use crate::models::HistoryEntry;

/// Errors that can occur while reading history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// There are no checkouts at all.
    #[error("no checkout history found")]
    NoHistory,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// History service.
pub struct HistoryService<'a> {
    checkouts: CheckoutRepository<'a>,
}

impl<'a> HistoryService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            checkouts: CheckoutRepository::new(store),
        }
    }

    /// Summarize every checkout, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::NoHistory` when there are no checkouts.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let checkouts = self.checkouts.list_all().await?;
        if checkouts.is_empty() {
            return Err(HistoryError::NoHistory);
        }
        Ok(checkouts.iter().map(HistoryEntry::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;
    use crate::models::CheckoutRecord;
    use serde_json::json;

    fn record(user: &str, customer: &str, lines: usize, total: i64) -> CheckoutRecord {
        let items = vec![json!({}); lines];
        serde_json::from_value(json!({
            "userId": user,
            "customer": { "name": customer },
            "shipping": { "name": "JNE", "address": "Jl. Mawar 1" },
            "items": items,
            "total": total,
            "checkoutDate": "2024-05-01T08:00:00Z",
            "image": "http://blobs.test/r.png"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_history() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            HistoryService::new(&store).list().await,
            Err(HistoryError::NoHistory)
        ));
    }

    #[tokio::test]
    async fn test_projects_every_checkout() {
        let store = MemoryDocumentStore::new();
        let checkouts = CheckoutRepository::new(&store);
        let first = checkouts.insert(record("u1", "Sari", 2, 50_000)).await.unwrap();
        checkouts.insert(record("u2", "Budi", 1, 7_500)).await.unwrap();

        let history = HistoryService::new(&store).list().await.unwrap();

        assert_eq!(history.len(), 2);
        let entry = serde_json::to_value(&history[0]).unwrap();
        assert_eq!(
            entry,
            json!({
                "checkoutId": first.checkout_id.as_str(),
                "name": "Sari",
                "totalItem": 2,
                "totalPrice": "Rp50.000",
                "shippingName": "JNE",
                "address": "Jl. Mawar 1"
            })
        );
        assert_eq!(history[1].name, "Budi");
    }
}
