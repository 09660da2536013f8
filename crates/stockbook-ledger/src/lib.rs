//! Stockbook Ledger — records sale/restock transactions, adjusts
//! product quantities atomically, and projects low-stock alerts.

pub mod config;
pub mod error;
pub mod service;

pub use config::LedgerConfig;
pub use error::LedgerError;
pub use service::{LedgerService, TransactionInput, TransactionOutput};
