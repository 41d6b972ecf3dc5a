use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::models::QueryResult;

struct CacheEntry {
    data: QueryResult,
    stored_at: Instant,
}

/// Time-boxed cache of query results.
///
/// Entries are considered absent once they are `ttl` old. Expired entries are
/// swept on insert, and the oldest entry is evicted when the cache is full.
pub struct QueryCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<QueryResult> {
        self.get_at(key, Instant::now()).await
    }

    pub async fn get_at(&self, key: &str, now: Instant) -> Option<QueryResult> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|e| now.saturating_duration_since(e.stored_at) < self.ttl)
            .map(|e| e.data.clone())
    }

    pub async fn put(&self, key: String, data: QueryResult) {
        self.put_at(key, data, Instant::now()).await
    }

    pub async fn put_at(&self, key: String, data: QueryResult, now: Instant) {
        let mut entries = self.entries.lock().await;

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, e| now.saturating_duration_since(e.stored_at) < self.ttl);

            if entries.len() >= self.capacity {
                if let Some(victim) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.stored_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&victim);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                data,
                stored_at: now,
            },
        );
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarketInsights, Source};
    use chrono::Utc;

    fn result(postcode: &str) -> QueryResult {
        QueryResult {
            success: true,
            properties: Vec::new(),
            insights: MarketInsights::default(),
            total: 0,
            postcode: postcode.to_string(),
            source: Source::Synthetic,
            degraded: true,
            fallback_reason: None,
            timestamp: Utc::now(),
            cached: false,
        }
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = QueryCache::new(Duration::from_secs(300), 10);
        let start = Instant::now();

        cache.put_at("k".into(), result("E1 6AN"), start).await;

        let hit = cache.get_at("k", start + Duration::from_secs(299)).await;
        assert_eq!(hit.map(|r| r.postcode), Some("E1 6AN".to_string()));
        assert!(cache.get_at("k", start + Duration::from_secs(300)).await.is_none());
        assert!(cache.get_at("missing", start).await.is_none());
    }

    #[tokio::test]
    async fn oldest_entry_is_evicted_at_capacity() {
        let cache = QueryCache::new(Duration::from_secs(300), 2);
        let start = Instant::now();

        cache.put_at("a".into(), result("A"), start).await;
        cache.put_at("b".into(), result("B"), start + Duration::from_secs(1)).await;
        cache.put_at("c".into(), result("C"), start + Duration::from_secs(2)).await;

        let now = start + Duration::from_secs(3);
        assert!(cache.get_at("a", now).await.is_none());
        assert!(cache.get_at("b", now).await.is_some());
        assert!(cache.get_at("c", now).await.is_some());
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn expired_entries_are_swept_before_evicting_live_ones() {
        let cache = QueryCache::new(Duration::from_secs(10), 2);
        let start = Instant::now();

        cache.put_at("a".into(), result("A"), start).await;
        cache.put_at("b".into(), result("B"), start + Duration::from_secs(8)).await;
        cache.put_at("c".into(), result("C"), start + Duration::from_secs(12)).await;

        let now = start + Duration::from_secs(13);
        assert!(cache.get_at("b", now).await.is_some());
        assert!(cache.get_at("c", now).await.is_some());
    }

    #[tokio::test]
    async fn overwriting_a_key_refreshes_it() {
        let cache = QueryCache::new(Duration::from_secs(10), 1);
        let start = Instant::now();

        cache.put_at("k".into(), result("OLD"), start).await;
        cache.put_at("k".into(), result("NEW"), start + Duration::from_secs(9)).await;

        let hit = cache.get_at("k", start + Duration::from_secs(15)).await;
        assert_eq!(hit.map(|r| r.postcode), Some("NEW".to_string()));
    }
}
