//! EVE Swagger Interface market adapter.
//!
//! - [`client`]: [`EsiClient`]: paged `GET` of a region's orders.
//! - [`dto`]: Wire shape of one order.
//! - [`settings`]: `[esi]` configuration section.

pub mod client;
pub mod dto;
pub mod settings;

pub use client::EsiClient;
pub use settings::EsiConfig;
