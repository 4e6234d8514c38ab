//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheCounters, CacheEntry, CacheStats, LruTracker};
use crate::cache::{ENTRY_OVERHEAD_BYTES, FALLBACK_VALUE_SIZE};
use crate::config::CacheConfig;
use crate::keys::type_prefix;

// == Cache Store ==
/// Single-owner cache storage with LRU eviction and TTL support.
///
/// All operations take `&mut self` or `&self`; sharing across tasks goes
/// through [`crate::cache::BoundedTtlCache`].
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Hit/miss counters
    counters: CacheCounters,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL for entries stored without one
    default_ttl: Duration,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// `max_size` is clamped to a minimum of 1 so the capacity bound always
    /// holds; [`CacheConfig::validate`] rejects 0 before it gets here.
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: CacheCounters::new(),
            max_size: max_size.max(1),
            default_ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_size, config.default_ttl)
    }

    // == Set ==
    /// Stores a value, resetting its creation and access time.
    ///
    /// Inserting a new key while at capacity first evicts the least recently
    /// used entry. Overwriting an existing key never evicts.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let now = Instant::now();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.counters.record_eviction();
                debug!(key = %evicted, "Evicted least recently used entry");
            }
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, ttl, now));
    }

    // == Get ==
    /// Retrieves a live value and marks it most recently used.
    ///
    /// Missing and expired keys count as misses; an expired entry is removed.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let now = Instant::now();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        if expired {
            self.remove(key);
            self.counters.record_miss();
            self.counters.record_expiration();
            debug!(key = %key, "Removed expired entry on access");
            return None;
        }

        self.counters.record_hit();
        self.lru.touch(key);
        let entry = self.entries.get_mut(key)?;
        entry.touch(now);
        Some(&entry.value)
    }

    // == Has ==
    /// Whether `get` would return a value. Touches neither stats nor recency.
    pub fn has(&self, key: &str) -> bool {
        !self.is_expired(key)
    }

    // == Is Expired ==
    /// Whether the key is absent or past its TTL. Does not remove anything.
    pub fn is_expired(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .map_or(true, |entry| entry.is_expired(now))
    }

    /// Full entry, expired or not, without side effects.
    #[cfg(test)]
    pub(crate) fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes a single entry. Statistics are untouched.
    ///
    /// Returns whether an entry was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.counters.reset();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove(key);
            self.counters.record_expiration();
        }

        expired_keys.len()
    }

    // == Keys ==
    /// Keys of live entries at call time.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Live keys starting with `"<cache_type>:"`.
    pub fn keys_by_type(&self, cache_type: impl AsRef<str>) -> Vec<String> {
        let prefix = type_prefix(cache_type.as_ref());
        self.keys()
            .into_iter()
            .filter(|key| key.starts_with(&prefix))
            .collect()
    }

    /// Removes every entry under `"<cache_type>:"`, expired or not.
    ///
    /// Returns how many were removed; counters are untouched.
    pub fn clear_by_type(&mut self, cache_type: impl AsRef<str>) -> usize {
        let prefix = type_prefix(cache_type.as_ref());
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();

        for key in &matching {
            self.remove(key);
        }

        matching.len()
    }

    /// Current hit/miss counters.
    pub fn counters(&self) -> CacheCounters {
        self.counters
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<V: Serialize> CacheStore<V> {
    // == Stats ==
    /// Returns a fresh statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        CacheStats::from_counters(&self.counters, self.entries.len(), self.memory_usage())
    }

    // == Memory Usage ==
    /// Estimated footprint: two bytes per UTF-16 unit of the key and of the
    /// JSON-serialized value, plus a fixed overhead per entry.
    ///
    /// Expired entries that have not been swept are counted.
    pub fn memory_usage(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, entry)| {
                let key_units = key.encode_utf16().count();
                2 * key_units + 2 * serialized_units(&entry.value) + ENTRY_OVERHEAD_BYTES
            })
            .sum()
    }
}

fn serialized_units<V: Serialize>(value: &V) -> usize {
    match serde_json::to_string(value) {
        Ok(json) => json.encode_utf16().count(),
        Err(err) => {
            debug!("Value not serializable, using fallback size: {}", err);
            FALLBACK_VALUE_SIZE
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::thread::sleep;

    const LONG_TTL: Duration = Duration::from_secs(300);

    fn store(max_size: usize) -> CacheStore<String> {
        CacheStore::new(max_size, LONG_TTL)
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.max_size(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.get("key1").map(String::as_str), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_uses_default_ttl() {
        let mut store = store(100);
        store.set("key1", "value1".to_string(), None);
        assert_eq!(store.peek("key1").unwrap().ttl, LONG_TTL);

        store.set("key2", "value2".to_string(), Some(Duration::from_secs(1)));
        assert_eq!(store.peek("key2").unwrap().ttl, Duration::from_secs(1));
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);

        assert!(store.get("nonexistent").is_none());
        assert_eq!(store.counters().misses, 1);
    }

    #[test]
    fn test_store_remove() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);
        store.get("key1");

        assert!(store.remove("key1"));
        assert!(!store.remove("key1"));
        assert!(store.is_empty());
        // Single-key removal leaves counters alone
        assert_eq!(store.counters().hits, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);
        store.set("key1", "value2".to_string(), None);

        assert_eq!(store.get("key1").map(String::as_str), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), Some(Duration::from_millis(10)));
        assert!(store.has("key1"));

        sleep(Duration::from_millis(30));

        assert!(!store.has("key1"));
        assert!(store.is_expired("key1"));
        // has/is_expired do not remove
        assert_eq!(store.len(), 1);

        assert!(store.get("key1").is_none());
        assert_eq!(store.len(), 0);
        assert_eq!(store.counters().misses, 1);
    }

    #[test]
    fn test_store_zero_max_size_clamps_to_one() {
        let mut store = store(0);
        assert_eq!(store.max_size(), 1);

        store.set("a", "A".to_string(), None);
        store.set("b", "B".to_string(), None);

        assert_eq!(store.len(), 1);
        assert!(store.has("b"));
        assert_eq!(store.counters().evictions, 1);
    }

    #[test]
    fn test_store_counts_expirations() {
        let mut store = store(100);

        store.set("lazy", "v".to_string(), Some(Duration::from_millis(5)));
        store.set("swept1", "v".to_string(), Some(Duration::from_millis(5)));
        store.set("swept2", "v".to_string(), Some(Duration::from_millis(5)));
        store.set("live", "v".to_string(), None);
        sleep(Duration::from_millis(20));

        assert!(store.get("lazy").is_none());
        assert_eq!(store.counters().expirations, 1);

        assert_eq!(store.cleanup_expired(), 2);
        assert_eq!(store.counters().expirations, 3);
        assert_eq!(store.stats().expirations, 3);

        // Explicit removals are not expirations
        store.remove("live");
        assert_eq!(store.counters().expirations, 3);
    }

    #[test]
    fn test_store_zero_ttl_expires_immediately() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), Some(Duration::ZERO));
        sleep(Duration::from_millis(2));

        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        store.set("key1", "value1".to_string(), None);
        store.set("key2", "value2".to_string(), None);
        store.set("key3", "value3".to_string(), None);
        store.set("key4", "value4".to_string(), None);

        assert_eq!(store.len(), 3);
        assert!(!store.has("key1"));
        assert!(store.has("key2"));
        assert!(store.has("key3"));
        assert!(store.has("key4"));
        assert_eq!(store.counters().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(2);

        store.set("a", "A".to_string(), None);
        store.set("b", "B".to_string(), None);
        store.get("a");
        store.set("c", "C".to_string(), None);

        assert!(store.has("a"));
        assert!(!store.has("b"));
        assert!(store.has("c"));
    }

    #[test]
    fn test_store_has_does_not_touch_recency() {
        let mut store = store(2);

        store.set("a", "A".to_string(), None);
        store.set("b", "B".to_string(), None);
        assert!(store.has("a"));
        store.set("c", "C".to_string(), None);

        assert!(!store.has("a"));
        assert_eq!(store.counters().hits, 0);
        assert_eq!(store.counters().misses, 0);
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2);

        store.set("a", "A".to_string(), None);
        store.set("b", "B".to_string(), None);
        store.set("a", "A2".to_string(), None);

        assert_eq!(store.len(), 2);
        assert!(store.has("a"));
        assert!(store.has("b"));
        assert_eq!(store.counters().evictions, 0);
    }

    #[test]
    fn test_store_clear_resets_counters() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);
        store.get("key1");
        store.get("missing");

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.counters(), CacheCounters::default());
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), Some(Duration::from_millis(10)));
        store.set("key2", "value2".to_string(), Some(Duration::from_secs(10)));

        sleep(Duration::from_millis(30));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.cleanup_expired(), 0);
        assert_eq!(store.len(), 1);
        assert!(store.has("key2"));
    }

    #[test]
    fn test_store_keys_skip_expired() {
        let mut store = store(100);

        store.set("live", "v".to_string(), None);
        store.set("stale", "v".to_string(), Some(Duration::from_millis(5)));
        sleep(Duration::from_millis(20));

        assert_eq!(store.keys(), vec!["live".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_keys_by_type() {
        let mut store = store(100);

        store.set("destination:paris", "p".to_string(), None);
        store.set("destination:rome", "r".to_string(), None);
        store.set("currency:usd", "u".to_string(), None);
        store.set("destinations", "x".to_string(), None);

        let mut keys = store.keys_by_type("destination");
        keys.sort();
        assert_eq!(keys, vec!["destination:paris", "destination:rome"]);
    }

    #[test]
    fn test_store_clear_by_type() {
        let mut store = store(100);

        store.set("destination:paris", "p".to_string(), None);
        store.set("destination:rome", "r".to_string(), None);
        store.set("currency:usd", "u".to_string(), None);
        store.get("currency:usd");

        assert_eq!(store.clear_by_type("destination"), 2);
        assert_eq!(store.clear_by_type("destination"), 0);
        assert_eq!(store.len(), 1);
        assert!(store.has("currency:usd"));
        assert_eq!(store.counters().hits, 1);
    }

    #[test]
    fn test_store_memory_usage() {
        let mut store = store(100);
        assert_eq!(store.memory_usage(), 0);

        // key: 3 units, value: "\"abcd\"" is 6 units
        store.set("key", "abcd".to_string(), None);
        assert_eq!(store.memory_usage(), 2 * 3 + 2 * 6 + ENTRY_OVERHEAD_BYTES);
    }

    #[test]
    fn test_store_memory_usage_counts_utf16_units() {
        let mut store: CacheStore<u32> = CacheStore::new(10, LONG_TTL);

        // "é" is one UTF-16 unit, two UTF-8 bytes
        store.set("é", 42, None);
        assert_eq!(store.memory_usage(), 2 + 2 * 2 + ENTRY_OVERHEAD_BYTES);
    }

    #[test]
    fn test_store_memory_usage_fallback() {
        // JSON object keys must be strings
        let mut value = BTreeMap::new();
        value.insert(vec![1u8], 1u8);

        let mut store = CacheStore::new(10, LONG_TTL);
        store.set("k", value, None);

        assert_eq!(
            store.memory_usage(),
            2 + 2 * FALLBACK_VALUE_SIZE + ENTRY_OVERHEAD_BYTES
        );
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);
        store.get("key1");
        store.get("key1");
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 75.0);
        assert_eq!(stats.memory_usage, store.memory_usage());
    }
}
