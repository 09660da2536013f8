//! Ledger service — stock transaction orchestration.

use stockbook_core::alerts::{self, StockAlert};
use stockbook_core::error::StockResult;
use stockbook_core::models::stock_entry::{EntryKind, LedgerRecord, RecordEntry, StockEntry};
use stockbook_core::repository::{
    LedgerFilter, LedgerRepository, PaginatedResult, Pagination, ProductRepository, StockGuard,
};
use tracing::info;

use crate::config::LedgerConfig;
use crate::error::LedgerError;

/// Input for recording one stock transaction.
#[derive(Debug)]
pub struct TransactionInput {
    pub owner_id: String,
    pub product_id: i64,
    /// Units moved. Always positive; direction comes from `kind`.
    pub quantity: i64,
    pub kind: EntryKind,
    pub note: Option<String>,
}

/// Successful transaction result.
#[derive(Debug)]
pub struct TransactionOutput {
    /// The committed ledger entry.
    pub entry: StockEntry,
    /// On-hand quantity of the product as of this entry.
    pub stock_after: i64,
}

/// Ledger service.
///
/// The single write path for product quantities: every change goes
/// through a recorded transaction. Generic over repository
/// implementations so that the service layer has no dependency on
/// the database crate.
pub struct LedgerService<P: ProductRepository, L: LedgerRepository> {
    products: P,
    ledger: L,
    config: LedgerConfig,
}

impl<P: ProductRepository, L: LedgerRepository> LedgerService<P, L> {
    pub fn new(products: P, ledger: L, config: LedgerConfig) -> Self {
        Self {
            products,
            ledger,
            config,
        }
    }

    /// Record a sale or restock and adjust the product's on-hand
    /// quantity in one unit of work.
    pub async fn record_transaction(
        &self,
        input: TransactionInput,
    ) -> StockResult<TransactionOutput> {
        // 1. The caller's identity comes from the external provider;
        //    a blank id means the request never went through it.
        if input.owner_id.trim().is_empty() {
            return Err(LedgerError::MissingIdentity.into());
        }

        // 2. Validate shape before touching the store.
        if input.quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(input.quantity).into());
        }
        if input.product_id <= 0 {
            return Err(LedgerError::InvalidProductId(input.product_id).into());
        }
        if let Some(note) = &input.note {
            if note.chars().count() > self.config.max_note_length {
                return Err(LedgerError::NoteTooLong {
                    limit: self.config.max_note_length,
                }
                .into());
            }
        }

        // 3. Append the entry and move the quantity atomically. The
        //    insufficient-stock check runs inside the same transaction,
        //    so a concurrent sale can never oversell past the guard.
        let guard = StockGuard {
            reject_insufficient: !self.config.allow_backorder,
        };
        let recorded = self
            .ledger
            .record(
                RecordEntry {
                    owner_id: input.owner_id,
                    product_id: input.product_id,
                    quantity: input.quantity,
                    kind: input.kind,
                    note: input.note,
                },
                guard,
            )
            .await?;

        info!(
            entry_id = recorded.entry.id,
            product_id = recorded.entry.product_id,
            kind = ?recorded.entry.kind,
            quantity = recorded.entry.quantity,
            stock_after = recorded.stock_after,
            "Recorded stock transaction"
        );

        Ok(TransactionOutput {
            entry: recorded.entry,
            stock_after: recorded.stock_after,
        })
    }

    /// List the caller's transaction history, newest first, each entry
    /// enriched with the product's current name.
    pub async fn list_transactions(
        &self,
        owner_id: &str,
        filter: LedgerFilter,
        pagination: Pagination,
    ) -> StockResult<PaginatedResult<LedgerRecord>> {
        if owner_id.trim().is_empty() {
            return Err(LedgerError::MissingIdentity.into());
        }
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(LedgerError::InvalidDateRange.into());
            }
        }

        self.ledger.list(owner_id, filter, pagination).await
    }

    /// Project the low-stock alert view over the caller's catalog.
    ///
    /// Computed from current product state at read time; nothing is
    /// stored per alert.
    pub async fn stock_alerts(&self, owner_id: &str) -> StockResult<Vec<StockAlert>> {
        if owner_id.trim().is_empty() {
            return Err(LedgerError::MissingIdentity.into());
        }

        let products = self.products.list_all(owner_id).await?;
        Ok(alerts::compute_alerts(&products))
    }
}
