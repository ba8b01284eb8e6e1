//! In-process record store used by tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::models::{Collection, RecordKey};
use crate::store::{key_of, Predicate, RecordStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Collection, BTreeMap<RecordKey, Value>>>,
    failing: AtomicBool,
    scans: AtomicUsize,
    delete_budget: Mutex<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the store were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Lets `n` more deletes succeed, then fails every later delete.
    pub fn fail_deletes_after(&self, n: usize) {
        *self.delete_budget.lock().unwrap() = Some(n);
    }

    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(&collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(
        &self,
        collection: Collection,
        key: &RecordKey,
    ) -> Result<Option<Value>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.get(&collection).and_then(|t| t.get(key)).cloned())
    }

    async fn scan(
        &self,
        collection: Collection,
        predicate: &Predicate,
    ) -> Result<Vec<Value>, StoreError> {
        self.check()?;
        self.scans.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .get(&collection)
            .map(|t| t.values().filter(|d| predicate.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn put(&self, collection: Collection, item: Value) -> Result<(), StoreError> {
        self.check()?;
        let key = key_of(collection, &item)?;
        self.tables
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .insert(key, item);
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        key: &RecordKey,
        delta: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(Value::Object(doc)) = tables.get_mut(&collection).and_then(|t| t.get_mut(key))
        else {
            return Ok(None);
        };
        doc.extend(delta);
        Ok(Some(Value::Object(doc.clone())))
    }

    async fn delete(&self, collection: Collection, key: &RecordKey) -> Result<(), StoreError> {
        self.check()?;
        if let Some(left) = self.delete_budget.lock().unwrap().as_mut() {
            if *left == 0 {
                return Err(StoreError::Unavailable("delete rejected".to_string()));
            }
            *left -= 1;
        }
        if let Some(table) = self.tables.lock().unwrap().get_mut(&collection) {
            table.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_merges_top_level_attributes() {
        let store = MemoryStore::new();
        store
            .put(
                Collection::Jobs,
                json!({"jobId": "1", "category": "Design", "role": "Old", "salary": "10"}),
            )
            .await
            .unwrap();

        let mut delta = Map::new();
        delta.insert("role".to_string(), json!("New"));
        let updated = store
            .update(Collection::Jobs, &RecordKey::new("Design", "1"), delta)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated["role"], "New");
        assert_eq!(updated["salary"], "10");
    }

    #[tokio::test]
    async fn test_update_of_absent_key_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update(Collection::Jobs, &RecordKey::new("x", "y"), Map::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_failing_store_errors() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let err = store.scan(Collection::Jobs, &Predicate::new()).await;
        assert!(matches!(err, Err(StoreError::Unavailable(_))));
    }
}
