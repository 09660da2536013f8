//! SurrealDB implementation of [`LedgerRepository`].
//!
//! The write path runs as one database transaction: product lookup, stock
//! guard, entry insert, and quantity adjustment either all commit or
//! nothing does. Rejection paths perform no writes and are reported
//! through a typed outcome record rather than error text. The quantity
//! adjustment is a relative increment evaluated at commit time, so
//! concurrent transactions against the same product serialize without
//! lost updates.

use chrono::{DateTime, Utc};
use stockbook_core::error::{StockError, StockResult};
use stockbook_core::models::stock_entry::{EntryKind, LedgerRecord, RecordEntry, StockEntry};
use stockbook_core::repository::{
    LedgerFilter, LedgerRepository, PaginatedResult, Pagination, RecordedEntry, StockGuard,
};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;
use crate::retry::RetryPolicy;

const RECORD_TXN: &str = "\
BEGIN TRANSACTION;
LET $product = (SELECT * FROM type::record('product', $product_id) \
    WHERE owner_id = $owner_id)[0];
LET $available = $product.quantity ?? 0;
LET $blocked = $product != NONE AND $reject_insufficient \
    AND ($available + $delta) < 0;
LET $ok = $product != NONE AND !$blocked;
LET $entry_id = IF $ok \
    { (UPSERT ONLY counter:stock_entry SET value += 1).value } \
    ELSE { NONE };
LET $entry = IF $ok {
    (CREATE ONLY type::record('stock_entry', $entry_id) SET \
        owner_id = $owner_id, \
        product = type::record('product', $product_id), \
        quantity = $quantity, \
        kind = $kind, \
        note = $note)
} ELSE { NONE };
LET $updated = IF $ok {
    (UPDATE ONLY type::record('product', $product_id) SET \
        quantity += $delta, \
        updated_at = time::now())
} ELSE { NONE };
RETURN {
    found: $product != NONE,
    blocked: $blocked,
    available: $product.quantity,
    entry_id: $entry_id,
    created_at: $entry.created_at,
    stock_after: $updated.quantity
};
COMMIT TRANSACTION;";

/// Typed outcome of the write transaction. The optional fields are NONE
/// on the rejection paths.
#[derive(Debug, SurrealValue)]
struct RecordOutcomeRow {
    found: bool,
    blocked: bool,
    available: Option<i64>,
    entry_id: Option<i64>,
    created_at: Option<DateTime<Utc>>,
    stock_after: Option<i64>,
}

/// DB-side row for ledger listings. The product name resolves through the
/// record link and is NONE once the product has been deleted.
#[derive(Debug, SurrealValue)]
struct LedgerRow {
    record_id: i64,
    product_id: i64,
    product_name: Option<String>,
    quantity: i64,
    kind: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_kind(s: &str) -> Result<EntryKind, DbError> {
    match s {
        "sale" => Ok(EntryKind::Sale),
        "restock" => Ok(EntryKind::Restock),
        other => Err(DbError::Permanent(format!("unknown entry kind: {other}"))),
    }
}

fn kind_to_string(kind: &EntryKind) -> &'static str {
    match kind {
        EntryKind::Sale => "sale",
        EntryKind::Restock => "restock",
    }
}

impl LedgerRow {
    fn into_record(self) -> Result<LedgerRecord, DbError> {
        Ok(LedgerRecord {
            id: self.record_id,
            product_id: self.product_id,
            product_name: self
                .product_name
                .unwrap_or_else(|| "Unknown Product".to_string()),
            quantity: self.quantity,
            kind: parse_kind(&self.kind)?,
            note: self.note,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Ledger repository.
#[derive(Clone)]
pub struct SurrealLedgerRepository<C: Connection> {
    db: Surreal<C>,
    retry: RetryPolicy,
}

impl<C: Connection> SurrealLedgerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy applied to storage operations.
    pub fn with_retry(db: Surreal<C>, retry: RetryPolicy) -> Self {
        Self { db, retry }
    }
}

impl<C: Connection> LedgerRepository for SurrealLedgerRepository<C> {
    async fn record(&self, input: RecordEntry, guard: StockGuard) -> StockResult<RecordedEntry> {
        let outcome = self
            .retry
            .run(|| record_entry(&self.db, &input, guard))
            .await?;

        if !outcome.found {
            return Err(StockError::NotFound {
                entity: "product".into(),
                id: input.product_id.to_string(),
            });
        }
        if outcome.blocked {
            return Err(StockError::InsufficientStock {
                requested: input.quantity,
                available: outcome.available.unwrap_or(0),
            });
        }

        let (id, created_at, stock_after) = match (
            outcome.entry_id,
            outcome.created_at,
            outcome.stock_after,
        ) {
            (Some(id), Some(created_at), Some(stock_after)) => (id, created_at, stock_after),
            _ => {
                return Err(StockError::Internal(
                    "ledger transaction committed without an entry".into(),
                ));
            }
        };

        Ok(RecordedEntry {
            entry: StockEntry {
                id,
                owner_id: input.owner_id,
                product_id: input.product_id,
                quantity: input.quantity,
                kind: input.kind,
                note: input.note,
                created_at,
            },
            stock_after,
        })
    }

    async fn list(
        &self,
        owner_id: &str,
        filter: LedgerFilter,
        pagination: Pagination,
    ) -> StockResult<PaginatedResult<LedgerRecord>> {
        let (total, rows) = self
            .retry
            .run(|| list_entries(&self.db, owner_id, &filter, &pagination))
            .await?;

        let items = rows
            .into_iter()
            .map(LedgerRow::into_record)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

async fn record_entry<C: Connection>(
    db: &Surreal<C>,
    input: &RecordEntry,
    guard: StockGuard,
) -> Result<RecordOutcomeRow, DbError> {
    let delta = input.kind.sign() * input.quantity;

    let result = db
        .query(RECORD_TXN)
        .bind(("owner_id", input.owner_id.clone()))
        .bind(("product_id", input.product_id))
        .bind(("quantity", input.quantity))
        .bind(("kind", kind_to_string(&input.kind).to_string()))
        .bind(("note", input.note.clone()))
        .bind(("delta", delta))
        .bind(("reject_insufficient", guard.reject_insufficient))
        .await?;

    let mut result = result.check()?;

    // Statement results: 0 = BEGIN, 1-7 = LETs, 8 = RETURN, 9 = COMMIT.
    let outcome: Option<RecordOutcomeRow> = result.take(8)?;
    outcome.ok_or_else(|| DbError::Permanent("ledger transaction returned no outcome".into()))
}

async fn list_entries<C: Connection>(
    db: &Surreal<C>,
    owner_id: &str,
    filter: &LedgerFilter,
    pagination: &Pagination,
) -> Result<(u64, Vec<LedgerRow>), DbError> {
    let mut conds = vec!["owner_id = $owner_id"];
    if filter.search.is_some() {
        conds.push(
            "(string::contains(string::lowercase(product.name ?? ''), $search) \
             OR string::contains(string::lowercase(note ?? ''), $search))",
        );
    }
    if filter.from.is_some() {
        conds.push("created_at >= $from");
    }
    if filter.to.is_some() {
        conds.push("created_at <= $to");
    }
    let where_clause = conds.join(" AND ");

    let search = filter.search.as_ref().map(|s| s.trim().to_lowercase());

    let count_query =
        format!("SELECT count() AS total FROM stock_entry WHERE {where_clause} GROUP ALL");
    let mut count_builder = db
        .query(&count_query)
        .bind(("owner_id", owner_id.to_string()));
    if let Some(search) = &search {
        count_builder = count_builder.bind(("search", search.clone()));
    }
    if let Some(from) = filter.from {
        count_builder = count_builder.bind(("from", from));
    }
    if let Some(to) = filter.to {
        count_builder = count_builder.bind(("to", to));
    }
    let mut count_result = count_builder.await?;
    let count_rows: Vec<CountRow> = count_result.take(0)?;
    let total = count_rows.first().map(|r| r.total).unwrap_or(0);

    let page_query = format!(
        "SELECT meta::id(id) AS record_id, meta::id(product) AS product_id, \
         product.name AS product_name, quantity, kind, note, created_at \
         FROM stock_entry WHERE {where_clause} \
         ORDER BY created_at DESC \
         LIMIT $limit START $offset"
    );
    let mut builder = db
        .query(&page_query)
        .bind(("owner_id", owner_id.to_string()))
        .bind(("limit", pagination.limit))
        .bind(("offset", pagination.offset));
    if let Some(search) = search {
        builder = builder.bind(("search", search));
    }
    if let Some(from) = filter.from {
        builder = builder.bind(("from", from));
    }
    if let Some(to) = filter.to {
        builder = builder.bind(("to", to));
    }
    let mut result = builder.await?;

    let rows: Vec<LedgerRow> = result.take(0)?;
    Ok((total, rows))
}
