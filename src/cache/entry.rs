//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored value with its timing metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was inserted or last overwritten
    pub created_at: Instant,
    /// Maximum age before the entry is treated as absent
    pub ttl: Duration,
    /// Last successful `get`
    pub last_accessed: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped at `now`.
    pub fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
            ttl,
            last_accessed: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry whose age equals its TTL is still live;
    /// it expires once the age is strictly greater. A zero TTL therefore
    /// expires as soon as any time has passed.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.age(now) > self.ttl
    }

    // == Age ==
    /// Time since creation, saturating at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    #[cfg(test)]
    pub(crate) fn ttl_remaining(&self, now: Instant) -> Duration {
        self.ttl.saturating_sub(self.age(now))
    }

    // == Touch ==
    /// Records an access.
    pub fn touch(&mut self, now: Instant) {
        self.last_accessed = now;
    }
}
