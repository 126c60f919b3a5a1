use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use lru::LruCache;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::config::{CacheConfig, CacheStrategy};
use crate::search::results::SearchResults;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct QueryKey {
    pub corpus: String,
    pub query: String,
    pub options_fingerprint: u64,
}

impl QueryKey {
    pub fn new(corpus: impl Into<String>, query: impl Into<String>, options_fingerprint: u64) -> Self {
        QueryKey { corpus: corpus.into(), query: query.into(), options_fingerprint }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: SearchResults,
    created_at: u64,
    last_accessed: u64,
    access_count: u64,
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
    pub size: usize,
    pub capacity: usize,
    pub estimated_bytes: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
    }
}

/// Bounded, TTL-expiring cache of search result lists. Wraps an `lru::LruCache` whose
/// own access order doubles as the LRU eviction order; under the MRU strategy the
/// most-recently-touched key (front of `LruCache::iter`) is evicted instead.
pub struct CacheManager {
    cache: RwLock<LruCache<QueryKey, CacheEntry>>,
    config: CacheConfig,
    hits: AtomicUsize,
    misses: AtomicUsize,
    evictions: AtomicUsize,
}

impl CacheManager {
    pub fn new(config: CacheConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_size.max(1)).unwrap();
        CacheManager {
            cache: RwLock::new(LruCache::new(cap)),
            config,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            evictions: AtomicUsize::new(0),
        }
    }

    fn is_expired(&self, entry: &CacheEntry, at: u64) -> bool {
        at.saturating_sub(entry.created_at) > self.config.ttl_ms
    }

    pub fn get(&self, key: &QueryKey) -> Option<SearchResults> {
        let at = now_ms();
        let mut cache = self.cache.write();
        let expired = match cache.peek(key) {
            Some(entry) => self.is_expired(entry, at),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };
        if expired {
            cache.pop(key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        let entry = cache.get_mut(key).unwrap();
        entry.last_accessed = at;
        entry.access_count += 1;
        Some(entry.data.clone())
    }

    pub fn has(&self, key: &QueryKey) -> bool {
        let at = now_ms();
        let mut cache = self.cache.write();
        match cache.peek(key) {
            Some(entry) if self.is_expired(entry, at) => {
                cache.pop(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn set(&self, key: QueryKey, results: SearchResults) {
        let at = now_ms();
        let mut cache = self.cache.write();

        if cache.len() >= self.config.max_size && !cache.contains(&key) {
            let evict_key = match self.config.strategy {
                CacheStrategy::Lru => cache.iter().last().map(|(k, _)| k.clone()),
                CacheStrategy::Mru => cache.iter().next().map(|(k, _)| k.clone()),
            };
            if let Some(k) = evict_key {
                cache.pop(&k);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        cache.put(key, CacheEntry { data: results, created_at: at, last_accessed: at, access_count: 1 });
    }

    pub fn remove(&self, key: &QueryKey) {
        self.cache.write().pop(key);
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Sweeps all expired entries.
    pub fn prune(&self) {
        let at = now_ms();
        let mut cache = self.cache.write();
        let expired: Vec<QueryKey> = cache
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, at))
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            cache.pop(&key);
        }
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.read();
        let estimated_bytes: usize = cache
            .iter()
            .map(|(k, v)| k.query.len() * 2 + k.corpus.len() * 2 + 64 + v.data.hits.len() * 128)
            .sum();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: cache.len(),
            capacity: self.config.max_size,
            estimated_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> SearchResults {
        SearchResults::default()
    }

    #[test]
    fn set_then_get_round_trips() {
        let cache = CacheManager::new(CacheConfig::default());
        let key = QueryKey::new("corpus", "hello", 1);
        cache.set(key.clone(), results());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn size_never_exceeds_max_size() {
        let config = CacheConfig { max_size: 2, ..CacheConfig::default() };
        let cache = CacheManager::new(config);
        cache.set(QueryKey::new("c", "q1", 1), results());
        cache.set(QueryKey::new("c", "q2", 2), results());
        cache.set(QueryKey::new("c", "q3", 3), results());
        assert!(cache.len() <= 2);
    }

    #[test]
    fn lru_strategy_evicts_least_recently_accessed() {
        let config = CacheConfig { max_size: 2, strategy: CacheStrategy::Lru, ..CacheConfig::default() };
        let cache = CacheManager::new(config);
        let k1 = QueryKey::new("c", "q1", 1);
        let k2 = QueryKey::new("c", "q2", 2);
        let k3 = QueryKey::new("c", "q3", 3);
        cache.set(k1.clone(), results());
        cache.set(k2.clone(), results());
        cache.get(&k1);
        cache.set(k3.clone(), results());
        assert!(cache.get(&k2).is_none());
        assert!(cache.get(&k1).is_some());
    }

    #[test]
    fn expired_entries_are_treated_as_misses() {
        let config = CacheConfig { ttl_ms: 0, ..CacheConfig::default() };
        let cache = CacheManager::new(config);
        let key = QueryKey::new("c", "q1", 1);
        cache.set(key.clone(), results());
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn hit_rate_reflects_hits_and_misses() {
        let cache = CacheManager::new(CacheConfig::default());
        let key = QueryKey::new("c", "q1", 1);
        cache.get(&key);
        cache.set(key.clone(), results());
        cache.get(&key);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }
}
