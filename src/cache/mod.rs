//! Cache module for API responses held in memory
//!
//! This module provides an expiring cache keyed by request URL. Entries live
//! for a fixed TTL and are removed by a background reaper task, so a lookup
//! may briefly return an entry past its TTL until the next reaper pass.

mod expiring;
mod reaper;

pub use expiring::{CacheConfig, ExpiringCache, DEFAULT_TTL};
