//! Redis cache adapter.
//!
//! Keys are stored as `{prefix}:{key}` with native `SETEX` expiry. The
//! connection manager is created lazily on first use so construction never
//! blocks and works outside a runtime.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use tokio::sync::OnceCell;
use tokio::time::timeout;

use rates_types::{CacheError, RateCache};

pub const DEFAULT_KEY_PREFIX: &str = "rateflow";

pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5000;

pub struct RedisCache {
    client: OnceCell<Arc<ConnectionManager>>,
    redis_url: String,
    timeout_ms: u64,
    key_prefix: String,
}

impl RedisCache {
    pub fn new(
        redis_url: impl Into<String>,
        key_prefix: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, CacheError> {
        let redis_url = redis_url.into();
        let key_prefix = key_prefix.into();

        if redis_url.is_empty() {
            return Err(CacheError::Backend("Redis URL cannot be empty".into()));
        }
        if key_prefix.is_empty() {
            return Err(CacheError::Backend("Redis key prefix cannot be empty".into()));
        }

        Ok(Self {
            client: OnceCell::new(),
            redis_url,
            timeout_ms,
            key_prefix,
        })
    }

    /// Connects eagerly so configuration errors surface at startup.
    pub async fn connect(
        redis_url: impl Into<String>,
        key_prefix: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, CacheError> {
        let cache = Self::new(redis_url, key_prefix, timeout_ms)?;
        cache.connection().await?;
        Ok(cache)
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .client
            .get_or_try_init(|| initialize_connection(&self.redis_url, self.timeout_ms))
            .await?;
        Ok(manager.as_ref().clone())
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

async fn initialize_connection(
    redis_url: &str,
    timeout_ms: u64,
) -> Result<Arc<ConnectionManager>, CacheError> {
    let client = redis::Client::open(redis_url)
        .map_err(|e| CacheError::Backend(format!("Failed to create Redis client: {}", e)))?;

    let manager = timeout(
        Duration::from_millis(timeout_ms),
        ConnectionManager::new(client),
    )
    .await
    .map_err(|_| CacheError::Backend(format!("Redis connection timeout after {}ms", timeout_ms)))?
    .map_err(|e| CacheError::Backend(format!("Failed to create connection manager: {}", e)))?;

    tracing::debug!("redis connection established");
    Ok(Arc::new(manager))
}

fn map_redis_error(error: RedisError, context: &str) -> CacheError {
    match error.kind() {
        redis::ErrorKind::TypeError => {
            CacheError::Serialization(format!("Redis type error in '{}': {}", context, error))
        }
        redis::ErrorKind::AuthenticationFailed => {
            CacheError::Backend("Redis authentication failed".to_string())
        }
        redis::ErrorKind::IoError => {
            CacheError::Backend(format!("Redis connection error in '{}': {}", context, error))
        }
        _ => CacheError::Backend(format!("Redis operation '{}' failed: {}", context, error)),
    }
}

#[async_trait]
impl RateCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get(self.prefixed(key))
            .await
            .map_err(|e| map_redis_error(e, "get"))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(self.prefixed(key), value, seconds)
            .await
            .map_err(|e| map_redis_error(e, "set_ex"))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(self.prefixed(key))
            .await
            .map_err(|e| map_redis_error(e, "del"))
    }
}
