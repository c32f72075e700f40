//! Cache adapters implementing the `RateCache` port.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use rates_types::{CacheError, RateCache};

pub use memory::MemoryCache;
pub use self::redis::RedisCache;

/// Cache selected at startup: Redis when configured, in-process otherwise.
pub enum CacheBackend {
    Redis(RedisCache),
    Memory(MemoryCache),
}

impl CacheBackend {
    /// Builds a Redis cache for `redis_url`, or an in-memory one when absent.
    ///
    /// The Redis connection is lazy; an unreachable server only produces
    /// logged cache misses.
    pub fn from_url(
        redis_url: Option<&str>,
        key_prefix: &str,
        timeout_ms: u64,
    ) -> Result<Self, CacheError> {
        match redis_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => Ok(CacheBackend::Redis(RedisCache::new(
                url, key_prefix, timeout_ms,
            )?)),
            None => Ok(CacheBackend::Memory(MemoryCache::new())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CacheBackend::Redis(_) => "redis",
            CacheBackend::Memory(_) => "memory",
        }
    }
}

#[async_trait]
impl RateCache for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            CacheBackend::Redis(c) => c.get(key).await,
            CacheBackend::Memory(c) => c.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheBackend::Redis(c) => c.set(key, value, ttl).await,
            CacheBackend::Memory(c) => c.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            CacheBackend::Redis(c) => c.delete(key).await,
            CacheBackend::Memory(c) => c.delete(key).await,
        }
    }
}
