//! Cache port.
//!
//! The cache is never authoritative. Callers treat every error as a miss.

use std::time::Duration;

use crate::domain::CurrencyPair;
use crate::error::CacheError;

/// How long a latest-rate response stays cached.
pub const LATEST_RATE_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache key of the latest-rate response for `pair`.
pub fn latest_cache_key(pair: CurrencyPair) -> String {
    format!("latest:{}", pair)
}

/// String key/value store with per-entry TTL.
#[async_trait::async_trait]
pub trait RateCache: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurrencyCode;

    #[test]
    fn test_latest_cache_key_uses_canonical_pair() {
        let pair = CurrencyPair::new(CurrencyCode::CNY, CurrencyCode::JPY).unwrap();
        assert_eq!(latest_cache_key(pair), "latest:CNY/JPY");
        assert_eq!(latest_cache_key(pair.inverse()), "latest:JPY/CNY");
    }
}
