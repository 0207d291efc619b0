//! Outreach Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Rendering of core [`Filter`](outreach_core::query::Filter)s into
//!   SurrealQL
//! - Implementations of the `outreach-core` repository traits
//! - Error types ([`DbError`])

mod connection;
mod error;
mod filter;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
