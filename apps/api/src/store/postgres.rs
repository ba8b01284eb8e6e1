use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::debug;

use crate::models::{Collection, RecordKey};
use crate::store::{key_of, Predicate, RecordStore, StoreError};

/// PostgreSQL-backed document table. One JSONB document per row, keyed by
/// `(partition_key, record_id)`. Scans read the whole table and filter in
/// process. Document attributes are not indexed.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Pool exhaustion and shutdown are reported as unavailability rather than
/// as query failures.
fn classify(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get(
        &self,
        collection: Collection,
        key: &RecordKey,
    ) -> Result<Option<Value>, StoreError> {
        let sql = format!(
            "SELECT document FROM {} WHERE partition_key = $1 AND record_id = $2",
            collection.table()
        );
        let doc = sqlx::query_scalar::<_, Value>(&sql)
            .bind(&key.partition)
            .bind(&key.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        Ok(doc)
    }

    async fn scan(
        &self,
        collection: Collection,
        predicate: &Predicate,
    ) -> Result<Vec<Value>, StoreError> {
        let sql = format!(
            "SELECT document FROM {} ORDER BY partition_key, record_id",
            collection.table()
        );
        let docs = sqlx::query_scalar::<_, Value>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        let scanned = docs.len();

        let matched: Vec<Value> = docs
            .into_iter()
            .filter(|doc| predicate.matches(doc))
            .collect();

        debug!(
            "Scanned {collection}: {scanned} documents, {} matched",
            matched.len()
        );
        Ok(matched)
    }

    async fn put(&self, collection: Collection, item: Value) -> Result<(), StoreError> {
        let key = key_of(collection, &item)?;
        let sql = format!(
            r#"
            INSERT INTO {} (partition_key, record_id, document)
            VALUES ($1, $2, $3)
            ON CONFLICT (partition_key, record_id)
            DO UPDATE SET document = EXCLUDED.document, updated_at = now()
            "#,
            collection.table()
        );
        sqlx::query(&sql)
            .bind(&key.partition)
            .bind(&key.id)
            .bind(&item)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        key: &RecordKey,
        delta: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        // jsonb `||` replaces top-level attributes present in the delta.
        let sql = format!(
            r#"
            UPDATE {}
            SET document = document || $3, updated_at = now()
            WHERE partition_key = $1 AND record_id = $2
            RETURNING document
            "#,
            collection.table()
        );
        let updated = sqlx::query_scalar::<_, Value>(&sql)
            .bind(&key.partition)
            .bind(&key.id)
            .bind(Value::Object(delta))
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        Ok(updated)
    }

    async fn delete(&self, collection: Collection, key: &RecordKey) -> Result<(), StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE partition_key = $1 AND record_id = $2",
            collection.table()
        );
        sqlx::query(&sql)
            .bind(&key.partition)
            .bind(&key.id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
