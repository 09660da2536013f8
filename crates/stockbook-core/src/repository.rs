//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Owner-scoped repositories require
//! an `owner_id` parameter to enforce data isolation.

use chrono::{DateTime, Utc};

use crate::error::StockResult;
use crate::models::{
    product::{CreateProduct, Product, UpdateProduct},
    stock_entry::{LedgerRecord, RecordEntry, StockEntry},
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Filter criteria for ledger listings. All criteria are optional and
/// combine conjunctively.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    /// Case-insensitive substring match against product name or note.
    pub search: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
}

/// Stock policy enforced inside the ledger write transaction.
#[derive(Debug, Clone, Copy)]
pub struct StockGuard {
    /// Reject sales that would drive on-hand quantity below zero.
    pub reject_insufficient: bool,
}

/// Result of a committed ledger write.
#[derive(Debug, Clone)]
pub struct RecordedEntry {
    pub entry: StockEntry,
    /// Product quantity as of this entry's commit.
    pub stock_after: i64,
}

pub trait ProductRepository: Send + Sync {
    fn create(&self, input: CreateProduct) -> impl Future<Output = StockResult<Product>> + Send;
    fn get(&self, owner_id: &str, id: i64) -> impl Future<Output = StockResult<Product>> + Send;
    fn update(
        &self,
        owner_id: &str,
        id: i64,
        input: UpdateProduct,
    ) -> impl Future<Output = StockResult<Product>> + Send;
    fn delete(&self, owner_id: &str, id: i64) -> impl Future<Output = StockResult<()>> + Send;
    fn list(
        &self,
        owner_id: &str,
        pagination: Pagination,
    ) -> impl Future<Output = StockResult<PaginatedResult<Product>>> + Send;
    /// Unpaginated listing for projections over the full catalog.
    fn list_all(&self, owner_id: &str) -> impl Future<Output = StockResult<Vec<Product>>> + Send;
}

pub trait LedgerRepository: Send + Sync {
    /// Appends one entry and applies its signed effect to the product's
    /// quantity as a single atomic unit. Rejection paths write nothing.
    fn record(
        &self,
        input: RecordEntry,
        guard: StockGuard,
    ) -> impl Future<Output = StockResult<RecordedEntry>> + Send;
    fn list(
        &self,
        owner_id: &str,
        filter: LedgerFilter,
        pagination: Pagination,
    ) -> impl Future<Output = StockResult<PaginatedResult<LedgerRecord>>> + Send;
}

pub trait UserRepository: Send + Sync {
    /// Creates or refreshes a provisioned user. Identity-provider webhooks
    /// may deliver the same event more than once.
    fn upsert(&self, input: CreateUser) -> impl Future<Output = StockResult<User>> + Send;
    fn get(&self, user_id: &str) -> impl Future<Output = StockResult<User>> + Send;
}
