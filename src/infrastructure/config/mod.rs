//! Infrastructure configuration modules.

pub mod cache;
pub mod ingestion;
pub mod logging;
pub mod settings;
