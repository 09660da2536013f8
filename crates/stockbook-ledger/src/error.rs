//! Ledger service error types.

use stockbook_core::error::StockError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("caller identity is missing")]
    MissingIdentity,

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("product id must be positive, got {0}")]
    InvalidProductId(i64),

    #[error("note exceeds {limit} characters")]
    NoteTooLong { limit: usize },

    #[error("'from' must not be later than 'to'")]
    InvalidDateRange,
}

impl From<LedgerError> for StockError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::MissingIdentity => StockError::Unauthorized,
            LedgerError::InvalidQuantity(_)
            | LedgerError::InvalidProductId(_)
            | LedgerError::NoteTooLong { .. }
            | LedgerError::InvalidDateRange => StockError::Validation {
                message: err.to_string(),
            },
        }
    }
}
