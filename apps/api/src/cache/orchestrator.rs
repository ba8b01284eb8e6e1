//! Read-through caching and mutation-driven invalidation.
//!
//! Cache failures never fail a request: a broken read is a miss, a broken
//! write or invalidation is logged and dropped. Staleness after a failed
//! invalidation is bounded by the entry TTL.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::keys::record_key;
use crate::cache::CacheStore;
use crate::errors::AppError;
use crate::models::Collection;

#[derive(Clone)]
pub struct CacheOrchestrator {
    cache: Arc<dyn CacheStore>,
}

impl CacheOrchestrator {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Returns the cached value under `key`, or runs `compute`, caches its
    /// result for `ttl_secs`, and returns it. Errors from `compute` are
    /// returned as-is and never cached.
    ///
    /// No locking: concurrent misses may both compute and both write.
    pub async fn read_through<T, F, Fut>(
        &self,
        key: &str,
        ttl_secs: u64,
        compute: F,
    ) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(hit) = self.lookup::<T>(key).await {
            return Ok(hit);
        }

        let value = compute().await?;
        self.store(key, &value, ttl_secs).await;
        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Cache HIT: {key}");
                    Some(value)
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry {key}: {e}");
                    None
                }
            },
            Ok(None) => {
                debug!("Cache MISS: {key}");
                None
            }
            Err(e) => {
                warn!("Cache read failed for {key}, treating as miss: {e}");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache serialization failed for {key}: {e}");
                return;
            }
        };
        if let Err(e) = self.cache.set_with_ttl(key, &raw, ttl_secs).await {
            warn!("Cache write failed for {key}: {e}");
        }
    }

    /// Drops the single-record entry for `id`.
    pub async fn invalidate_record(&self, collection: Collection, id: &str) {
        let key = record_key(collection, id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!("Failed to invalidate {key}: {e}");
        }
    }

    /// Drops every cached listing query for `collection`.
    pub async fn invalidate_collection_listings(&self, collection: Collection) {
        let prefix = collection.listing_prefix();
        match self.cache.delete_by_prefix(prefix).await {
            Ok(removed) => info!("Invalidated {removed} cached listings under {prefix}"),
            Err(e) => warn!("Failed to invalidate listings under {prefix}: {e}"),
        }
    }

    /// Invalidation hook run after every successful mutation of `id`.
    pub async fn invalidate_after_mutation(&self, collection: Collection, id: &str) {
        self.invalidate_record(collection, id).await;
        self.invalidate_collection_listings(collection).await;
    }
}
