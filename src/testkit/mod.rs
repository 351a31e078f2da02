//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`market`]: [`ScriptedMarketApi`](market::ScriptedMarketApi): paged
//!   responses with scripted failures, throttling, latency, and call counters.
//! - [`store`]: [`MemoryOrderStore`](store::MemoryOrderStore): counting
//!   in-memory [`OrderStore`](crate::port::OrderStore).
//! - [`cache`]: Cache backends that fail on demand.
//! - [`clock`]: [`ManualClock`](clock::ManualClock) for the rate limiter.
//! - [`domain`]: Builders for orders and identifiers.
//! - [`config`]: Canonical test configurations.

pub mod cache;
pub mod clock;
pub mod config;
pub mod domain;
pub mod market;
pub mod store;
