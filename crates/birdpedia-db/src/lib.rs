//! Database layer for Birdpedia.
//!
//! Provides the SQLite connection pool (via `r2d2`) and [`BirdStore`], the
//! persistence abstraction over the `birds` table. The store has two
//! operations, [`Store::create_bird`] and [`Store::get_birds`], each issuing
//! a single literal SQL statement.
//!
//! # Design decisions
//!
//! - **Explicit pool**: the pool is passed into [`BirdStore::new`]; the
//!   crate holds no global connection state.
//! - **Typed row mapping**: rows are read column by column into a
//!   [`birdpedia_types::Bird`]; a NULL or non-TEXT column is reported as
//!   [`StoreError::Decode`] rather than coerced.
//! - **No schema management**: the `birds` table is provisioned outside the
//!   crate. `sql/birds.sql` holds the reference DDL.

mod error;
mod pool;
mod store;

pub use error::StoreError;
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
pub use store::{BirdStore, Store};

/// Reference DDL for the `birds` table, for provisioning scripts and tests.
pub const BIRDS_SCHEMA: &str = include_str!("../sql/birds.sql");
