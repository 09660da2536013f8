//! Error types for the stockbook system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StockError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Caller identity missing or invalid")]
    Unauthorized,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StockResult<T> = Result<T, StockError>;
