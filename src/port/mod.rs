//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams where the ingestion pipeline meets the outside world.
//! Adapters implement them; tests substitute scripted versions from the
//! `testkit` module.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  limiter, retry, fetch, │
//!     ┌──────────────┤  cache, orchestrator    ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Market  │            │   Order     │              │   Cache   │
//! │   API   │            │   Store     │              │  Backend  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```

pub mod outbound;

pub use outbound::cache::CacheBackend;
pub use outbound::market::MarketApi;
pub use outbound::store::OrderStore;
