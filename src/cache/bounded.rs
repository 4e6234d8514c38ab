//! Bounded TTL Cache
//!
//! Thread-safe cache handle owning the store and its background sweep.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::config::{CacheConfig, CacheOverrides};
use crate::error::Result;
use crate::tasks::spawn_cleanup_task;

/// Running background sweep.
#[derive(Debug)]
struct Sweeper {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    fn stop(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

// == Bounded TTL Cache ==
/// Bounded in-memory cache with per-entry TTL and LRU eviction.
///
/// Each operation holds the store lock only for its own duration. The handle
/// is owned explicitly: create it at startup, share it behind an `Arc`, and
/// call [`destroy`](Self::destroy) at shutdown. Dropping the handle also
/// stops the sweep.
///
/// # Example
/// ```ignore
/// let cache: BoundedTtlCache<String> = BoundedTtlCache::new(CacheConfig::default())?;
/// let key = generate_key("Paris", "Berlin", 1000, "food,museums", 4, CacheType::Destination);
/// if let Some(hit) = cache.get(&key) {
///     return Ok(hit);
/// }
/// let fresh = fetch_destination(&key).await?;
/// cache.set(key, fresh.clone(), None);
/// ```
#[derive(Debug)]
pub struct BoundedTtlCache<V> {
    store: Arc<Mutex<CacheStore<V>>>,
    config: CacheConfig,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<V> BoundedTtlCache<V>
where
    V: Send + 'static,
{
    // == Constructor ==
    /// Creates a cache, starting the background sweep when enabled.
    ///
    /// The sweep needs a tokio runtime. Outside one, a warning is logged and
    /// expiration relies on the lazy checks alone.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(Mutex::new(CacheStore::from_config(&config)));
        let sweeper = if config.auto_cleanup {
            match Handle::try_current() {
                Ok(_) => {
                    let token = CancellationToken::new();
                    let handle = spawn_cleanup_task(
                        Arc::downgrade(&store),
                        config.cleanup_interval,
                        token.clone(),
                    );
                    Some(Sweeper { token, handle })
                }
                Err(_) => {
                    warn!("No tokio runtime available, background cleanup disabled");
                    None
                }
            }
        } else {
            None
        };

        debug!(
            "Cache initialized: max_size={}, default_ttl={}ms, auto_cleanup={}",
            config.max_size,
            config.default_ttl.as_millis(),
            sweeper.is_some()
        );

        Ok(Self {
            store,
            config,
            sweeper: Mutex::new(sweeper),
        })
    }

    /// Creates a cache from defaults merged with `overrides`.
    pub fn from_overrides(overrides: CacheOverrides) -> Result<Self> {
        Self::new(CacheConfig::from_overrides(overrides))
    }
}

impl<V> BoundedTtlCache<V> {
    /// Configuration the cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Inserts or overwrites `key`. `ttl` falls back to the configured default.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.store.lock().set(key, value, ttl);
    }

    // == Has ==
    /// Whether a `get` would succeed, without touching stats or recency.
    pub fn has(&self, key: &str) -> bool {
        self.store.lock().has(key)
    }

    /// Whether `key` is absent or past its TTL.
    pub fn is_expired(&self, key: &str) -> bool {
        self.store.lock().is_expired(key)
    }

    // == Remove ==
    /// Removes one entry; statistics are untouched.
    pub fn remove(&self, key: &str) -> bool {
        self.store.lock().remove(key)
    }

    // == Clear ==
    /// Removes every entry and resets hit/miss counters.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    /// `Some(key)` removes that entry, `None` clears everything.
    pub fn clear_key(&self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.remove(key);
            }
            None => self.clear(),
        }
    }

    /// Removes expired entries now, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.store.lock().cleanup_expired()
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.lock().keys()
    }

    pub fn keys_by_type(&self, cache_type: impl AsRef<str>) -> Vec<String> {
        self.store.lock().keys_by_type(cache_type)
    }

    pub fn clear_by_type(&self, cache_type: impl AsRef<str>) -> usize {
        self.store.lock().clear_by_type(cache_type)
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Whether the background sweep is still scheduled.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|sweeper| !sweeper.handle.is_finished())
    }

    // == Destroy ==
    /// Stops the background sweep and empties the cache.
    ///
    /// After this returns no sweep runs again. Safe to call more than once;
    /// the cache stays usable, without a sweep.
    pub fn destroy(&self) {
        if let Some(sweeper) = self.sweeper.lock().take() {
            sweeper.stop();
            debug!("Background cleanup stopped");
        }
        self.store.lock().clear();
    }
}

impl<V: Clone> BoundedTtlCache<V> {
    // == Get ==
    /// Returns a live value and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        self.store.lock().get(key).cloned()
    }

    /// Returns the cached value or stores and returns `produce()`.
    ///
    /// The producer runs without the lock held.
    pub fn get_or_insert_with<F>(&self, key: &str, ttl: Option<Duration>, produce: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = produce();
        self.set(key, value.clone(), ttl);
        value
    }

    /// Async memoization for fallible producers such as API calls.
    ///
    /// Only `Ok` results are cached; errors are returned untouched.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        produce: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = produce().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }
}

impl<V: Serialize> BoundedTtlCache<V> {
    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }
}

impl<V> Drop for BoundedTtlCache<V> {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.get_mut().take() {
            sweeper.stop();
        }
    }
}
