//! Core domain types for stockbook: models, repository traits, the shared
//! error taxonomy, and the low-stock alert projection.
//!
//! This crate performs no I/O. Storage implementations live in
//! `stockbook-db` and orchestration in `stockbook-ledger`.

pub mod alerts;
pub mod error;
pub mod models;
pub mod repository;
