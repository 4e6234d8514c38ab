//! Configuration Module
//!
//! Cache configuration built from documented defaults merged with caller
//! overrides. Overrides can also be loaded from environment variables.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default maximum number of entries
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default TTL: 6 hours
pub const DEFAULT_TTL: Duration = Duration::from_millis(6 * 60 * 60 * 1000);

/// Default interval between background sweeps: 30 minutes
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_millis(30 * 60 * 1000);

/// Cache configuration parameters.
///
/// Immutable once handed to a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Whether the background sweep runs
    pub auto_cleanup: bool,
    /// Interval between background sweeps
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: DEFAULT_TTL,
            auto_cleanup: true,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Merges caller overrides onto the defaults.
    ///
    /// A negative `default_ttl_ms` clamps to zero, so entries expire on the
    /// next check.
    pub fn from_overrides(overrides: CacheOverrides) -> Self {
        let defaults = Self::default();
        Self {
            max_size: overrides.max_size.unwrap_or(defaults.max_size),
            default_ttl: overrides
                .default_ttl_ms
                .map(millis_clamped)
                .unwrap_or(defaults.default_ttl),
            auto_cleanup: overrides.auto_cleanup.unwrap_or(defaults.auto_cleanup),
            cleanup_interval: overrides
                .cleanup_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Set the maximum number of entries.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the TTL used when `set` gets none.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Enable or disable the background sweep.
    pub fn with_auto_cleanup(mut self, enabled: bool) -> Self {
        self.auto_cleanup = enabled;
        self
    }

    /// Set the sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Rejects configurations the cache cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be at least 1".to_string(),
            ));
        }
        if self.auto_cleanup && self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be non-zero when auto_cleanup is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

// == Overrides ==
/// Partial configuration; unset fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheOverrides {
    pub max_size: Option<usize>,
    #[serde(alias = "defaultTtl")]
    pub default_ttl_ms: Option<i64>,
    pub auto_cleanup: Option<bool>,
    #[serde(alias = "cleanupInterval")]
    pub cleanup_interval_ms: Option<u64>,
}

impl CacheOverrides {
    /// Loads overrides from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds
    /// - `CACHE_AUTO_CLEANUP` - `true`/`false`
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep interval in milliseconds
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            max_size: parse_var(&lookup, "CACHE_MAX_SIZE"),
            default_ttl_ms: parse_var(&lookup, "CACHE_DEFAULT_TTL_MS"),
            auto_cleanup: parse_var(&lookup, "CACHE_AUTO_CLEANUP"),
            cleanup_interval_ms: parse_var(&lookup, "CACHE_CLEANUP_INTERVAL_MS"),
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}, using default", name, raw);
            None
        }
    }
}

fn millis_clamped(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}
