//! Key Construction
//!
//! Namespace tags for cached payloads and the normalized key builder used
//! for destination lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace tag prepended to keys as `"<type>:"`.
///
/// Type-scoped operations (`keys_by_type`, `clear_by_type`) match on this
/// prefix, so no secondary index is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    Destination,
    Currency,
    Reddit,
    Weather,
    Places,
    Search,
    Ai,
}

impl CacheType {
    pub const ALL: [CacheType; 7] = [
        CacheType::Destination,
        CacheType::Currency,
        CacheType::Reddit,
        CacheType::Weather,
        CacheType::Places,
        CacheType::Search,
        CacheType::Ai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::Destination => "destination",
            CacheType::Currency => "currency",
            CacheType::Reddit => "reddit",
            CacheType::Weather => "weather",
            CacheType::Places => "places",
            CacheType::Search => "search",
            CacheType::Ai => "ai",
        }
    }

    /// Builds `"<type>:<rest>"`.
    pub fn key(&self, rest: &str) -> String {
        format!("{}:{}", self.as_str(), rest)
    }
}

impl AsRef<str> for CacheType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix matched by type-scoped operations.
pub fn type_prefix(cache_type: &str) -> String {
    format!("{}:", cache_type)
}

/// Builds a deterministic key for a destination query.
///
/// `destination` and `origin` are trimmed and lower-cased. `interests` is a
/// comma-separated list; each item is trimmed and lower-cased and the list is
/// sorted, so `"beach, hiking"` and `"Hiking,Beach"` produce the same key.
///
/// Result: `"<type>:<destination>-<origin>-<budget>-<interests>-<duration>"`.
pub fn generate_key(
    destination: &str,
    origin: &str,
    budget: impl fmt::Display,
    interests: &str,
    duration: impl fmt::Display,
    cache_type: impl AsRef<str>,
) -> String {
    let mut interests: Vec<String> = interests
        .split(',')
        .map(|interest| interest.trim().to_lowercase())
        .collect();
    interests.sort();

    format!(
        "{}:{}-{}-{}-{}-{}",
        cache_type.as_ref(),
        destination.trim().to_lowercase(),
        origin.trim().to_lowercase(),
        budget,
        interests.join(","),
        duration
    )
}
