//! In-memory document store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{CollectionPath, Document, DocumentStore, FieldFilter, RepositoryError};

#[derive(Debug, Clone)]
struct StoredDocument {
    seq: u64,
    data: Value,
}

#[derive(Debug, Default)]
struct Collections {
    next_seq: u64,
    docs: HashMap<CollectionPath, HashMap<String, StoredDocument>>,
}

impl Collections {
    const fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Document store backed by process-local maps.
///
/// Every operation holds the lock for its whole duration, so single-document
/// updates and batch deletes are trivially atomic.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    inner: RwLock<Collections>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub async fn len(&self, collection: &CollectionPath) -> usize {
        self.inner
            .read()
            .await
            .docs
            .get(collection)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, RepositoryError> {
        let guard = self.inner.read().await;
        Ok(guard
            .docs
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|stored| Document {
                id: id.to_owned(),
                data: stored.data.clone(),
            }))
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<Document>, RepositoryError> {
        let guard = self.inner.read().await;
        let Some(docs) = guard.docs.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<(&String, &StoredDocument)> = docs
            .iter()
            .filter(|(_, stored)| filter.is_none_or(|f| f.matches(&stored.data)))
            .collect();
        matching.sort_by_key(|(_, stored)| stored.seq);

        Ok(matching
            .into_iter()
            .map(|(id, stored)| Document {
                id: id.clone(),
                data: stored.data.clone(),
            })
            .collect())
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        data: Value,
    ) -> Result<String, RepositoryError> {
        let id = super::generate_document_id();
        self.set(collection, &id, data).await?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Value,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.inner.write().await;
        let seq = guard.bump();
        let docs = guard.docs.entry(collection.clone()).or_default();
        match docs.get_mut(id) {
            Some(stored) => stored.data = data,
            None => {
                docs.insert(id.to_owned(), StoredDocument { seq, data });
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        patch: Value,
    ) -> Result<(), RepositoryError> {
        let Value::Object(fields) = patch else {
            return Err(RepositoryError::DataCorruption(
                "update patch must be a JSON object".to_owned(),
            ));
        };

        let mut guard = self.inner.write().await;
        let stored = guard
            .docs
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(RepositoryError::NotFound)?;

        match &mut stored.data {
            Value::Object(existing) => existing.extend(fields),
            other => *other = Value::Object(fields),
        }
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), RepositoryError> {
        let mut guard = self.inner.write().await;
        if let Some(docs) = guard.docs.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn batch_delete(
        &self,
        collection: &CollectionPath,
        ids: &[String],
    ) -> Result<(), RepositoryError> {
        let mut guard = self.inner.write().await;
        if let Some(docs) = guard.docs.get_mut(collection) {
            for id in ids {
                docs.remove(id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items() -> CollectionPath {
        CollectionPath::nested("carts", "c1", "items")
    }

    #[tokio::test]
    async fn test_query_returns_creation_order() {
        let store = MemoryDocumentStore::new();
        store.set(&items(), "b", json!({ "n": 1 })).await.unwrap();
        store.set(&items(), "a", json!({ "n": 2 })).await.unwrap();
        store.set(&items(), "c", json!({ "n": 3 })).await.unwrap();

        let ids: Vec<String> = store
            .query(&items(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_position() {
        let store = MemoryDocumentStore::new();
        store.set(&items(), "a", json!({ "n": 1 })).await.unwrap();
        store.set(&items(), "b", json!({ "n": 2 })).await.unwrap();
        store.set(&items(), "a", json!({ "n": 9 })).await.unwrap();

        let docs = store.query(&items(), None).await.unwrap();
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[0].data, json!({ "n": 9 }));
    }

    #[tokio::test]
    async fn test_query_filter() {
        let store = MemoryDocumentStore::new();
        store
            .add(&items(), json!({ "productId": "p1" }))
            .await
            .unwrap();
        store
            .add(&items(), json!({ "productId": "p2" }))
            .await
            .unwrap();

        let filter = FieldFilter::eq("productId", "p2");
        let docs = store.query(&items(), Some(&filter)).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].data["productId"], "p2");
    }

    #[tokio::test]
    async fn test_update_merges_top_level_fields() {
        let store = MemoryDocumentStore::new();
        store
            .set(&items(), "a", json!({ "quantity": 1, "productId": "p1" }))
            .await
            .unwrap();
        store
            .update(&items(), "a", json!({ "quantity": 4 }))
            .await
            .unwrap();

        let doc = store.get(&items(), "a").await.unwrap().unwrap();
        assert_eq!(doc.data, json!({ "quantity": 4, "productId": "p1" }));
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update(&items(), "ghost", json!({ "quantity": 4 }))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_batch_delete_and_collections_are_isolated() {
        let store = MemoryDocumentStore::new();
        let other = CollectionPath::nested("carts", "c2", "items");
        let a = store.add(&items(), json!({})).await.unwrap();
        let b = store.add(&items(), json!({})).await.unwrap();
        store.add(&other, json!({})).await.unwrap();

        store.batch_delete(&items(), &[a, b]).await.unwrap();

        assert_eq!(store.len(&items()).await, 0);
        assert_eq!(store.len(&other).await, 1);
    }
}
