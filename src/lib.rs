//! Marketsync - rate-limited, cache-first ingestion of regional market orders.
//!
//! This crate pulls paginated order-book snapshots from an ESI-style remote
//! market API under a hard request quota, merges every page of a region into
//! one collection (or fails the whole fetch), persists it, and serves reads
//! cache-first with the persisted store as a possibly-stale fallback.
//!
//! # Architecture
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - **`domain`** - Orders, identifiers, pagination primitives
//! - **`port`** - Traits for the remote market API, the order store, and the
//!   cache backend
//! - **`application`** - The ingestion pipeline
//!   - `RateLimiter` - Token bucket shared by every outbound call
//!   - `RetryPolicy` - Exponential backoff on throttling responses
//!   - `ParallelPageFetcher` - Bounded worker pool over the pages of a region
//!   - `OrderCache` - Compressed, TTL-bound region cache
//!   - `IngestionOrchestrator` - Cache, store, and refresh tiers
//! - **`adapter`** - ESI HTTP client, SQLite store, in-memory cache, CLI
//! - **`infrastructure`** - Configuration, logging, and wiring
//!
//! # Example
//!
//! ```no_run
//! use marketsync::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("marketsync.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
