//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod bounded;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use bounded::BoundedTtlCache;
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::{CacheCounters, CacheStats};
pub use store::CacheStore;

// == Public Constants ==
/// Fixed per-entry overhead added to the memory estimate
pub const ENTRY_OVERHEAD_BYTES: usize = 32;

/// UTF-16 units assumed for a value that cannot be serialized
pub const FALLBACK_VALUE_SIZE: usize = 1024;
