//! Bounded Cache - An in-memory response cache
//!
//! Memoizes expensive provider responses with bounded capacity, per-entry
//! TTL expiration, LRU eviction and usage statistics.

pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod tasks;

pub use cache::{BoundedTtlCache, CacheStats, CacheStore};
pub use config::{CacheConfig, CacheOverrides};
pub use error::{CacheError, Result};
pub use keys::{generate_key, CacheType};
