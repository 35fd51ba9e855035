//! `PostgreSQL` document store.
//!
//! Documents live in a single `documents` table keyed by `(collection, id)`
//! with the payload in a JSONB column. Field filters use JSONB containment so
//! they are served by the GIN index created in the initial migration.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::instrument;

use super::{CollectionPath, Document, DocumentStore, FieldFilter, RepositoryError};

/// Document store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn containment(filter: &FieldFilter) -> Value {
    let mut object = Map::new();
    object.insert(filter.field.clone(), filter.value.clone());
    Value::Object(object)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query_as::<_, (String, Value)>(
            r"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, data)| Document { id, data }))
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<Document>, RepositoryError> {
        let rows = match filter {
            Some(filter) => {
                sqlx::query_as::<_, (String, Value)>(
                    r"
                    SELECT id, data
                    FROM documents
                    WHERE collection = $1 AND data @> $2
                    ORDER BY created_at, id
                    ",
                )
                .bind(collection.as_str())
                .bind(containment(filter))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, (String, Value)>(
                    r"
                    SELECT id, data
                    FROM documents
                    WHERE collection = $1
                    ORDER BY created_at, id
                    ",
                )
                .bind(collection.as_str())
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|(id, data)| Document { id, data })
            .collect())
    }

    #[instrument(skip(self, data), fields(collection = %collection))]
    async fn add(
        &self,
        collection: &CollectionPath,
        data: Value,
    ) -> Result<String, RepositoryError> {
        let id = super::generate_document_id();

        sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip(self, data), fields(collection = %collection))]
    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Value,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, patch), fields(collection = %collection))]
    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        patch: Value,
    ) -> Result<(), RepositoryError> {
        if !patch.is_object() {
            return Err(RepositoryError::DataCorruption(
                "update patch must be a JSON object".to_owned(),
            ));
        }

        let result = sqlx::query(
            r"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(patch)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, ids), fields(collection = %collection, count = ids.len()))]
    async fn batch_delete(
        &self,
        collection: &CollectionPath,
        ids: &[String],
    ) -> Result<(), RepositoryError> {
        if ids.is_empty() {
            return Ok(());
        }

        // One statement, so the batch commits or fails as a whole.
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = ANY($2)")
            .bind(collection.as_str())
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_containment_document() {
        let filter = FieldFilter::eq("userId", "u1");
        assert_eq!(containment(&filter), json!({ "userId": "u1" }));
    }
}
