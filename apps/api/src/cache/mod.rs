//! Cache adapter and the read-through orchestrator built on top of it.

pub mod keys;
#[cfg(test)]
pub mod memory;
pub mod orchestrator;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use orchestrator::CacheOrchestrator;
pub use self::redis::RedisCache;

/// TTL for cached listing pages.
pub const LISTING_TTL_SECS: u64 = 300;
/// TTL for cached single-record fetches.
pub const RECORD_TTL_SECS: u64 = 600;
/// TTL for the government results view.
pub const RESULTS_TTL_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// Shared key-value cache with per-key TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, CacheError>;

    /// Deletes every key starting with `prefix`, returning how many were removed.
    /// The default enumerates then deletes one key at a time; not atomic.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let keys = self.list_keys(prefix).await?;
        for key in &keys {
            self.delete(key).await?;
        }
        Ok(keys.len())
    }
}

/// Cache that stores nothing. Used when Redis cannot be reached at startup so
/// every read falls through to the record store.
pub struct DisabledCache;

#[async_trait]
impl CacheStore for DisabledCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn list_keys(&self, _prefix: &str) -> Result<Vec<String>, CacheError> {
        Ok(vec![])
    }
}
