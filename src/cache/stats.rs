//! Cache Statistics Module
//!
//! Tracks hit/miss counters and builds point-in-time snapshots.

use serde::Serialize;

// == Cache Counters ==
/// Process-lifetime counters, reset only by a full clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounters {
    /// Successful lookups
    pub hits: u64,
    /// Lookups for absent or expired keys
    pub misses: u64,
    /// Entries removed to make room for new keys
    pub evictions: u64,
    /// Entries removed for being past their TTL, lazily or by a sweep
    pub expirations: u64,
}

impl CacheCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Hit Rate ==
    /// Hit percentage rounded to two decimals, 0 when nothing was requested.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        let percent = self.hits as f64 / total as f64 * 100.0;
        (percent * 100.0).round() / 100.0
    }
}

// == Cache Stats ==
/// Snapshot returned by `stats()`, computed fresh on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries currently stored, expired-but-unswept ones included
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Percentage in `0.0..=100.0`
    pub hit_rate: f64,
    /// Approximate footprint in bytes, see `CacheStore::memory_usage`
    pub memory_usage: usize,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    pub fn from_counters(counters: &CacheCounters, size: usize, memory_usage: usize) -> Self {
        Self {
            size,
            hits: counters.hits,
            misses: counters.misses,
            hit_rate: counters.hit_rate(),
            memory_usage,
            evictions: counters.evictions,
            expirations: counters.expirations,
        }
    }
}
