//! SQLite persistence adapter.
//!
//! Provides the SQLite-backed [`OrderStore`](crate::port::OrderStore) using
//! Diesel ORM with an r2d2 pool and embedded migrations.

pub mod db;
pub mod store;

pub use db::connection::{create_pool, run_migrations, DbPool};
pub use store::SqliteOrderStore;
