//! pokecache library
//!
//! Exposes the expiring response cache, the PokeAPI client built on it, and
//! the CLI types for use in integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
