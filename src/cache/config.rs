//! Cache configuration.

use std::time::Duration;

/// Configuration for a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,

    /// Time-to-live for cache entries.
    /// After this duration, entries are automatically evicted.
    pub ttl: Option<Duration>,

    /// Time-to-idle for cache entries.
    /// Entries are evicted if not accessed within this duration.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: None,
        }
    }
}

impl CacheConfig {
    /// Stored bot users. Rows never change after "start", so keep them long.
    pub fn stored_users() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(3600)), // 1 hour
            tti: None,
        }
    }

    /// Per-requester block sets, hit on every search.
    /// Writes go through the repository, which refreshes the entry.
    pub fn block_sets() -> Self {
        Self {
            max_capacity: 5_000,
            ttl: Some(Duration::from_secs(1800)), // 30 minutes max
            tti: Some(Duration::from_secs(600)),  // 10 minutes idle
        }
    }

    /// Matching sessions. Only idleness expires them, so an active
    /// conversation never loses its place.
    pub fn sessions() -> Self {
        Self {
            max_capacity: 100_000,
            ttl: None,
            tti: Some(Duration::from_secs(1800)), // 30 minutes idle
        }
    }

    /// City title lookups. VK city ids are stable.
    pub fn city_lookup() -> Self {
        Self {
            max_capacity: 2_000,
            ttl: Some(Duration::from_secs(24 * 3600)),
            tti: None,
        }
    }
}
