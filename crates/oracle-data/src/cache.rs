//! TTL caching for reference-data lookups

use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for one reference-data lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Ticker symbol
    pub symbol: String,
    /// Resource kind ("profile", "quote", "financials", "news")
    pub resource: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(symbol: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            resource: resource.into(),
        }
    }
}

/// Thread-safe TTL cache for raw reference data
pub struct DataCache {
    cache: Arc<RwLock<TimedCache<CacheKey, serde_json::Value>>>,
}

impl DataCache {
    /// Create a new cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Return the cached value, or run the fetcher and cache its result
    ///
    /// Fetch errors are propagated and never cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> std::result::Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<serde_json::Value, E>>,
    {
        {
            let mut cache = self.cache.write().await;
            if let Some(value) = cache.cache_get(&key) {
                tracing::debug!(?key, "cache hit");
                return Ok(value.clone());
            }
        }

        tracing::debug!(?key, "cache miss");
        let value = fetcher().await?;
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value.clone());
        Ok(value)
    }
}

/// Per-resource caches with TTLs matched to how fast each kind goes stale
pub struct CacheManager {
    /// Quotes go stale within a minute
    pub realtime: DataCache,
    /// Profiles and financial statements change rarely
    pub fundamental: DataCache,
    /// News is refreshed every few minutes
    pub news: DataCache,
}

impl CacheManager {
    /// Default TTLs: 60s quotes, 1h fundamentals, 5m news
    pub fn default_config() -> Self {
        Self {
            realtime: DataCache::new(Duration::from_secs(60)),
            fundamental: DataCache::new(Duration::from_secs(3600)),
            news: DataCache::new(Duration::from_secs(300)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_fetch_caches_result() {
        let cache = DataCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "profile");
        let value = serde_json::json!({"name": "Apple Inc."});

        let mut calls = 0;
        let result = cache
            .get_or_fetch(key.clone(), || {
                calls += 1;
                let value = value.clone();
                async { Ok::<_, String>(value) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(calls, 1);

        // Second lookup is served from cache
        let result = cache
            .get_or_fetch(key, || {
                calls += 1;
                let value = value.clone();
                async { Ok::<_, String>(value) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_fetch_error_not_cached() {
        let cache = DataCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "news");

        let result = cache
            .get_or_fetch(key.clone(), || async { Err::<serde_json::Value, _>("boom") })
            .await;
        assert!(result.is_err());

        // The failed lookup left nothing behind, so the fetcher runs again
        let mut calls = 0;
        let result = cache
            .get_or_fetch(key, || {
                calls += 1;
                async { Ok::<_, String>(serde_json::json!(1)) }
            })
            .await;
        assert!(result.is_ok());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_manager_tiers_are_independent() {
        let manager = CacheManager::default_config();
        let key = CacheKey::new("AAPL", "quote");

        let quote = manager
            .realtime
            .get_or_fetch(key.clone(), || async { Ok::<_, String>(serde_json::json!(1)) })
            .await
            .unwrap();
        assert_eq!(quote, serde_json::json!(1));

        // The same key misses in another tier
        let mut calls = 0;
        let news = manager
            .news
            .get_or_fetch(key, || {
                calls += 1;
                async { Ok::<_, String>(serde_json::json!(2)) }
            })
            .await
            .unwrap();
        assert_eq!(news, serde_json::json!(2));
        assert_eq!(calls, 1);
    }
}
