//! In-memory cache whose entries expire a fixed time after insertion
//!
//! Provides an `ExpiringCache` that maps request URLs to raw response bodies.
//! Entries are removed by a background reaper once they reach the configured
//! TTL; lookups themselves never check age.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::reaper::{EntryMap, ReaperHandle};

/// Default time-to-live for cached responses
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Shortest reap interval the reaper will run with
const MIN_REAP_INTERVAL: Duration = Duration::from_millis(1);

/// A single cached payload and the moment it was stored
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) value: Bytes,
    pub(crate) created_at: Instant,
}

/// Configuration for an expiring cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry lives before it becomes eligible for removal
    pub ttl: Duration,
    /// Time between reaper passes
    pub reap_interval: Duration,
}

impl CacheConfig {
    /// Creates a configuration that reaps once per TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            reap_interval: ttl,
        }
    }

    /// Overrides the reap interval, leaving the TTL unchanged
    pub fn with_reap_interval(mut self, reap_interval: Duration) -> Self {
        self.reap_interval = reap_interval;
        self
    }

    /// Worst-case age of an entry returned by `ExpiringCache::get`
    pub fn staleness_bound(&self) -> Duration {
        self.ttl.saturating_add(self.reap_interval)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Thread-safe key/value cache with time-based eviction
///
/// Every `add`, `get` and reaper pass takes the same lock, held only for the
/// map access itself. A `get` may return an entry up to one reap interval
/// past its TTL; see [`CacheConfig::staleness_bound`].
///
/// The reaper runs until [`ExpiringCache::stop`] or
/// [`ExpiringCache::shutdown`] is called, or the cache is dropped.
#[derive(Debug)]
pub struct ExpiringCache {
    entries: EntryMap,
    config: CacheConfig,
    reaper: ReaperHandle,
}

impl ExpiringCache {
    /// Creates a cache whose reaper runs once per `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self::with_config(CacheConfig::new(ttl))
    }

    /// Creates a cache with a custom configuration
    ///
    /// A zero reap interval is raised to one millisecond. The reaper runs on
    /// the current tokio runtime, or on a dedicated thread when called outside
    /// of one.
    pub fn with_config(mut config: CacheConfig) -> Self {
        config.reap_interval = config.reap_interval.max(MIN_REAP_INTERVAL);

        let entries: EntryMap = Arc::new(Mutex::new(HashMap::new()));
        let reaper = ReaperHandle::spawn(Arc::clone(&entries), config.ttl, config.reap_interval);

        tracing::debug!(
            ttl_ms = config.ttl.as_millis() as u64,
            reap_interval_ms = config.reap_interval.as_millis() as u64,
            "started expiring cache"
        );

        Self {
            entries,
            config,
            reaper,
        }
    }

    /// Stores `value` under `key`, replacing any previous entry and its age
    pub fn add(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        let entry = Entry {
            value: value.into(),
            created_at: Instant::now(),
        };
        self.entries.lock().insert(key.into(), entry);
    }

    /// Returns the value stored under `key`, if the reaper has not removed it
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.lock().get(key).map(|entry| entry.value.clone())
    }

    /// Returns the number of entries currently held
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns the time-to-live applied to every entry
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Returns the time between reaper passes
    pub fn reap_interval(&self) -> Duration {
        self.config.reap_interval
    }

    /// Signals the reaper to stop and returns immediately
    ///
    /// Entries already stored stay readable but no longer expire.
    pub fn stop(&self) {
        self.reaper.stop();
    }

    /// Stops the reaper and waits until its task has exited
    pub async fn shutdown(&self) {
        self.reaper.shutdown().await;
    }
}
