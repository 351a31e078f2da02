//! Application services (use cases).
//!
//! These services coordinate the outbound ports to ingest, persist and serve
//! regional market orders.

pub mod cache;
pub mod fetcher;
pub mod limiter;
pub mod orchestration;
pub mod retry;

pub use orchestration::{Freshness, IngestionOrchestrator};
