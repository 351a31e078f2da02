//! Application orchestration services.
//!
//! Ties the remote fetcher, the persisted store and the order cache into the
//! two read paths of the system:
//!
//! 1. **Read**: cache, then store. Never calls the remote API.
//! 2. **Refresh**: fetch every page, upsert into the store, repopulate the
//!    cache, return the merged orders.
//!
//! # Modules
//!
//! - [`orchestrator`]: [`IngestionOrchestrator`] and [`Freshness`]

pub mod orchestrator;

pub use orchestrator::{Freshness, IngestionOrchestrator};
