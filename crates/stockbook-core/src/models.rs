//! Domain models for stockbook.
//!
//! These are the core types shared across all crates.

pub mod product;
pub mod stock_entry;
pub mod user;
