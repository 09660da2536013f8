//! Database-specific error types and conversions.
//!
//! Driver failures are split into [`DbError::Transient`] and
//! [`DbError::Permanent`] at this boundary, so every retry decision
//! downstream is a variant match rather than message inspection.

use stockbook_core::error::StockError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Connection-class failure; safe to retry.
    #[error("Transient database error: {0}")]
    Transient(String),

    /// Query- or schema-class failure; retrying will not help.
    #[error("Database error: {0}")]
    Permanent(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },
}

impl DbError {
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Transient(_))
    }
}

// The driver surfaces transport problems only through its error rendering,
// so the marker check is confined to this one conversion.
const TRANSIENT_MARKERS: &[&str] = &[
    "connection",
    "timed out",
    "timeout",
    "websocket",
    "socket",
    "broken pipe",
    "conflict",
    "can be retried",
];

fn classify(message: String) -> DbError {
    let lowered = message.to_lowercase();
    if TRANSIENT_MARKERS.iter().any(|m| lowered.contains(m)) {
        DbError::Transient(message)
    } else {
        DbError::Permanent(message)
    }
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        classify(err.to_string())
    }
}

impl From<DbError> for StockError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StockError::NotFound { entity, id },
            DbError::InsufficientStock {
                requested,
                available,
            } => StockError::InsufficientStock {
                requested,
                available,
            },
            other => StockError::Database(other.to_string()),
        }
    }
}
