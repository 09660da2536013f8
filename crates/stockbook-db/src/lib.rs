//! Stockbook persistence — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection lifecycle ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Typed transient/permanent error classification ([`DbError`])
//! - Bounded retry for transient failures ([`RetryPolicy`])
//! - Implementations of the `stockbook-core` repository traits

mod connection;
mod error;
mod retry;
mod schema;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use retry::RetryPolicy;
pub use schema::{run_migrations, schema_v1};
