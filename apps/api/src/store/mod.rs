//! Record store adapter: a partitioned document table addressed by
//! `(partition, id)` with an unindexed full-scan filter.

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod predicate;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::models::{Collection, Record, RecordKey, ID_ATTR};

pub use postgres::PgRecordStore;
pub use predicate::{Condition, Predicate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document in {collection}: {reason}")]
    Malformed {
        collection: Collection,
        reason: String,
    },
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, collection: Collection, key: &RecordKey)
        -> Result<Option<Value>, StoreError>;

    /// Returns every document matching `predicate`, in one pass, ordered by physical key.
    async fn scan(
        &self,
        collection: Collection,
        predicate: &Predicate,
    ) -> Result<Vec<Value>, StoreError>;

    /// Writes `item`, overwriting any document under the same key.
    async fn put(&self, collection: Collection, item: Value) -> Result<(), StoreError>;

    /// Merges `delta` into the top level of the stored document.
    /// Returns `None` when no document exists under `key`.
    async fn update(
        &self,
        collection: Collection,
        key: &RecordKey,
        delta: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    async fn delete(&self, collection: Collection, key: &RecordKey) -> Result<(), StoreError>;
}

/// Extracts the physical key from a document.
pub fn key_of(collection: Collection, doc: &Value) -> Result<RecordKey, StoreError> {
    let field = |attr: &str| {
        doc.get(attr)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| StoreError::Malformed {
                collection,
                reason: format!("missing key attribute '{attr}'"),
            })
    };
    Ok(RecordKey::new(
        field(collection.partition_attr())?,
        field(ID_ATTR)?,
    ))
}

/// Scans and decodes documents as `R`. Documents that no longer decode are
/// skipped with a warning rather than failing the whole listing.
pub async fn scan_records<R: Record>(
    store: &dyn RecordStore,
    predicate: &Predicate,
) -> Result<Vec<R>, StoreError> {
    let docs = store.scan(R::COLLECTION, predicate).await?;
    Ok(decode_all(docs))
}

pub fn decode_all<R: Record>(docs: Vec<Value>) -> Vec<R> {
    let collection = R::COLLECTION;
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value::<R>(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable document in {collection}: {e}");
                None
            }
        })
        .collect()
}

pub async fn put_record<R: Record>(store: &dyn RecordStore, record: &R) -> Result<(), StoreError> {
    let doc = serde_json::to_value(record).map_err(|e| StoreError::Malformed {
        collection: R::COLLECTION,
        reason: e.to_string(),
    })?;
    store.put(R::COLLECTION, doc).await
}
