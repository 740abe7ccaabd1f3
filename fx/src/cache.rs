//! Per-base rate table caching with TTL support.

use chrono::Duration;
use fxconv_common::{constants, is_within, Currency, RateTable, Timestamp};
use std::collections::HashMap;
use tracing::debug;

/// Cached table entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    table: RateTable,
    fetched_at: Timestamp,
}

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a table stays fresh after its fetch.
    pub ttl: Duration,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: constants::rate_cache_ttl(),
        }
    }
}

/// Rate tables keyed by base currency, each stamped with its fetch time.
///
/// Stale entries are kept: they remain readable until a newer fetch for the
/// same base replaces them.
#[derive(Debug, Default)]
pub struct RateCache {
    entries: HashMap<Currency, CacheEntry>,
    config: RateCacheConfig,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a new rate cache with custom configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
        }
    }

    /// Table for `base` if it was fetched less than one TTL before `now`.
    pub fn get_fresh(&self, base: &Currency, now: Timestamp) -> Option<&RateTable> {
        match self.entries.get(base) {
            Some(entry) if is_within(entry.fetched_at, self.config.ttl, now) => {
                debug!(base = %base, "Cache hit");
                Some(&entry.table)
            }
            Some(_) => {
                debug!(base = %base, "Cache entry stale");
                None
            }
            None => {
                debug!(base = %base, "Cache miss");
                None
            }
        }
    }

    /// Whether a fresh table exists for `base` at `now`.
    pub fn is_fresh(&self, base: &Currency, now: Timestamp) -> bool {
        self.get_fresh(base, now).is_some()
    }

    /// Table for `base` regardless of age.
    pub fn get(&self, base: &Currency) -> Option<&RateTable> {
        self.entries.get(base).map(|entry| &entry.table)
    }

    /// Time of the last successful fetch for `base`.
    pub fn last_fetched(&self, base: &Currency) -> Option<Timestamp> {
        self.entries.get(base).map(|entry| entry.fetched_at)
    }

    /// Replace the table for `base`.
    ///
    /// The stored fetch time never moves backwards, even when completions
    /// arrive out of order.
    pub fn insert(&mut self, base: Currency, table: RateTable, fetched_at: Timestamp) {
        let fetched_at = match self.last_fetched(&base) {
            Some(previous) if previous > fetched_at => previous,
            _ => fetched_at,
        };
        self.entries.insert(base, CacheEntry { table, fetched_at });
    }

    /// Get the number of entries in cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics at `now`.
    pub fn stats(&self, now: Timestamp) -> CacheStats {
        let total = self.entries.len();
        let fresh = self
            .entries
            .values()
            .filter(|entry| is_within(entry.fetched_at, self.config.ttl, now))
            .count();

        CacheStats {
            total_entries: total,
            fresh_entries: fresh,
            stale_entries: total - fresh,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub stale_entries: usize,
}
