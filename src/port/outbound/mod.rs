//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod cache;
pub mod market;
pub mod store;
