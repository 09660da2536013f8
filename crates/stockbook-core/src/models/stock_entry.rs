//! Stock ledger domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Sale,
    Restock,
}

impl EntryKind {
    /// Signed multiplier applied to the product's on-hand quantity.
    pub fn sign(&self) -> i64 {
        match self {
            EntryKind::Sale => -1,
            EntryKind::Restock => 1,
        }
    }
}

/// One immutable ledger line. Entries are never updated or deleted;
/// corrections are recorded as compensating entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: i64,
    pub owner_id: String,
    pub product_id: i64,
    /// Positive magnitude; the sign comes from `kind`.
    pub quantity: i64,
    pub kind: EntryKind,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
    pub owner_id: String,
    pub product_id: i64,
    pub quantity: i64,
    pub kind: EntryKind,
    pub note: Option<String>,
}

/// A ledger entry joined with its product's current display name.
///
/// Entries outlive their product; a deleted product shows up as
/// "Unknown Product".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub kind: EntryKind,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
