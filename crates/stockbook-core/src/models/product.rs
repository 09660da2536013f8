//! Product domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    /// Owning user, as issued by the external identity provider.
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    /// On-hand stock. Written only by the ledger; may go negative when
    /// back-orders are enabled.
    pub quantity: i64,
    /// Unit sale price in minor currency units.
    pub price: i64,
    /// Unit acquisition cost in minor currency units.
    pub cost: i64,
    pub low_stock_threshold: i64,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Opening stock level.
    pub quantity: i64,
    pub price: i64,
    pub cost: i64,
    pub low_stock_threshold: i64,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

/// Catalog edits. Quantity is absent: stock moves only through ledger
/// transactions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub description: Option<Option<String>>,
    pub price: Option<i64>,
    pub cost: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub tags: Option<Vec<String>>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub image_url: Option<Option<String>>,
}
