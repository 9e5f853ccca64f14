//! TTL cache for read queries.
//!
//! Every list the CLI renders is refetched wholesale; the cache only
//! suppresses duplicate fetches inside the freshness window. Mutations
//! invalidate the entries they affect rather than patching them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::constants::{INDEXING_LAG_MS, QUERY_CACHE_TTL_MS};

#[derive(Clone)]
struct CacheEntry<T> {
    value: T,
    timestamp: Instant,
}

/// Keyed by query name plus parameters, e.g. `"submissions:0xevent"`.
#[derive(Clone)]
pub struct QueryCache<T: Clone> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    ttl: Duration,
}

impl<T: Clone> QueryCache<T> {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_millis(QUERY_CACHE_TTL_MS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Fresh value for `key`, or `None` when absent or expired.
    pub async fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.timestamp.elapsed() < self.ttl {
            debug!("Cache hit for {}", key);
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Overwrite the entry for `key` and sweep expired entries while the
    /// write lock is held.
    pub async fn put(&self, key: String, value: T) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                timestamp: Instant::now(),
            },
        );
        let ttl = self.ttl;
        let now = Instant::now();
        entries.retain(|_, e| now.duration_since(e.timestamp) < ttl);
    }

    pub async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            debug!("Invalidated cache entry {}", key);
        }
    }

    /// Drop every entry whose key starts with `prefix`. Used after
    /// mutations that affect a whole query family.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        if entries.len() < before {
            debug!(
                "Invalidated {} cache entries with prefix {}",
                before - entries.len(),
                prefix
            );
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl<T: Clone> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort pause after a mutation so the fullnode indexer catches up
/// before the follow-up refresh.
pub async fn wait_for_indexing() {
    tokio::time::sleep(Duration::from_millis(INDEXING_LAG_MS)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let cache: QueryCache<u32> = QueryCache::with_ttl(Duration::from_secs(60));
        cache.put("quests".to_string(), 7).await;
        assert_eq!(cache.get("quests").await, Some(7));
    }

    #[tokio::test]
    async fn test_cache_expires() {
        let cache: QueryCache<u32> = QueryCache::with_ttl(Duration::from_millis(1));
        cache.put("quests".to_string(), 7).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.get("quests").await, None);
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache: QueryCache<u32> = QueryCache::with_ttl(Duration::from_secs(60));
        cache.put("submissions:0xa".to_string(), 1).await;
        cache.put("submissions:0xb".to_string(), 2).await;
        cache.put("quests".to_string(), 3).await;

        cache.invalidate_prefix("submissions:").await;
        assert_eq!(cache.get("submissions:0xa").await, None);
        assert_eq!(cache.get("submissions:0xb").await, None);
        assert_eq!(cache.get("quests").await, Some(3));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache: QueryCache<u32> = QueryCache::with_ttl(Duration::from_secs(60));
        cache.put("quests".to_string(), 1).await;
        cache.put("quests".to_string(), 2).await;
        assert_eq!(cache.get("quests").await, Some(2));
    }
}
