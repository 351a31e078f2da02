//! Region order caching.

mod order;

pub use order::OrderCache;
