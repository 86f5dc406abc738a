//! Test support for the mention workspace.
//!
//! `database` hands out throwaway Postgres databases. With the `memory` feature, `memory` and
//! `fixtures` provide in-memory stores and member/activity builders for service and HTTP tests.

pub mod database;
#[cfg(feature = "memory")]
pub mod fixtures;
#[cfg(feature = "memory")]
pub mod memory;

mod error;

pub use database::{PG_DSN_ENV, TestDatabase, env_dsn, with_test_db};
pub use error::{Error, Result};
