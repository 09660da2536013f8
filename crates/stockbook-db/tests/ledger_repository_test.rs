//! Integration tests for the Ledger repository using in-memory SurrealDB.

use stockbook_core::error::StockError;
use stockbook_core::models::product::{CreateProduct, Product};
use stockbook_core::models::stock_entry::{EntryKind, RecordEntry};
use stockbook_core::repository::{
    LedgerFilter, LedgerRepository, Pagination, ProductRepository, StockGuard,
};
use stockbook_db::RetryPolicy;
use stockbook_db::repository::{SurrealLedgerRepository, SurrealProductRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

const GUARD: StockGuard = StockGuard {
    reject_insufficient: true,
};

const NO_GUARD: StockGuard = StockGuard {
    reject_insufficient: false,
};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    stockbook_db::run_migrations(&db).await.unwrap();
    db
}

/// Helper: create a product with the given opening stock.
async fn create_product(
    db: &Surreal<surrealdb::engine::local::Db>,
    owner: &str,
    name: &str,
    quantity: i64,
) -> Product {
    SurrealProductRepository::new(db.clone())
        .create(CreateProduct {
            owner_id: owner.into(),
            name: name.into(),
            description: None,
            quantity,
            price: 1000,
            cost: 600,
            low_stock_threshold: 3,
            tags: vec![],
            image_url: None,
        })
        .await
        .unwrap()
}

fn sale(owner: &str, product_id: i64, quantity: i64) -> RecordEntry {
    RecordEntry {
        owner_id: owner.into(),
        product_id,
        quantity,
        kind: EntryKind::Sale,
        note: None,
    }
}

fn restock(owner: &str, product_id: i64, quantity: i64) -> RecordEntry {
    RecordEntry {
        owner_id: owner.into(),
        product_id,
        quantity,
        kind: EntryKind::Restock,
        note: None,
    }
}

#[tokio::test]
async fn sale_decrements_stock_and_appends_entry() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 10).await;
    let repo = SurrealLedgerRepository::new(db.clone());

    let recorded = repo
        .record(sale("user-1", product.id, 3), GUARD)
        .await
        .unwrap();

    assert!(recorded.entry.id > 0);
    assert_eq!(recorded.entry.product_id, product.id);
    assert_eq!(recorded.entry.quantity, 3);
    assert_eq!(recorded.entry.kind, EntryKind::Sale);
    assert_eq!(recorded.stock_after, 7);

    // The product reflects the movement.
    let fetched = SurrealProductRepository::new(db)
        .get("user-1", product.id)
        .await
        .unwrap();
    assert_eq!(fetched.quantity, 7);
}

#[tokio::test]
async fn restock_increments_stock() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 10).await;
    let repo = SurrealLedgerRepository::new(db.clone());

    let recorded = repo
        .record(restock("user-1", product.id, 5), GUARD)
        .await
        .unwrap();

    assert_eq!(recorded.entry.kind, EntryKind::Restock);
    assert_eq!(recorded.stock_after, 15);

    let fetched = SurrealProductRepository::new(db)
        .get("user-1", product.id)
        .await
        .unwrap();
    assert_eq!(fetched.quantity, 15);
}

#[tokio::test]
async fn missing_product_writes_nothing() {
    let db = setup().await;
    let repo = SurrealLedgerRepository::new(db);

    let err = repo.record(sale("user-1", 999, 1), GUARD).await.unwrap_err();
    assert!(
        matches!(err, StockError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );

    // No entry was appended.
    let page = repo
        .list("user-1", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn wrong_owner_cannot_move_stock() {
    let db = setup().await;
    let product = create_product(&db, "user-a", "Private", 10).await;
    let repo = SurrealLedgerRepository::new(db.clone());

    let err = repo
        .record(sale("user-b", product.id, 1), GUARD)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::NotFound { .. }));

    let fetched = SurrealProductRepository::new(db)
        .get("user-a", product.id)
        .await
        .unwrap();
    assert_eq!(fetched.quantity, 10);
}

#[tokio::test]
async fn oversized_sale_is_rejected_with_available_amount() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 3).await;
    let repo = SurrealLedgerRepository::new(db.clone());

    let err = repo
        .record(sale("user-1", product.id, 5), GUARD)
        .await
        .unwrap_err();

    match err {
        StockError::InsufficientStock {
            requested,
            available,
        } => {
            assert_eq!(requested, 5);
            assert_eq!(available, 3);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Nothing moved, nothing was written.
    let fetched = SurrealProductRepository::new(db)
        .get("user-1", product.id)
        .await
        .unwrap();
    assert_eq!(fetched.quantity, 3);

    let page = repo
        .list("user-1", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn exact_depletion_is_allowed() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 3).await;
    let repo = SurrealLedgerRepository::new(db);

    let recorded = repo
        .record(sale("user-1", product.id, 3), GUARD)
        .await
        .unwrap();
    assert_eq!(recorded.stock_after, 0);
}

#[tokio::test]
async fn backorder_allows_negative_stock() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 3).await;
    let repo = SurrealLedgerRepository::new(db.clone());

    let recorded = repo
        .record(sale("user-1", product.id, 5), NO_GUARD)
        .await
        .unwrap();
    assert_eq!(recorded.stock_after, -2);

    let fetched = SurrealProductRepository::new(db)
        .get("user-1", product.id)
        .await
        .unwrap();
    assert_eq!(fetched.quantity, -2);
}

#[tokio::test]
async fn entries_are_listed_newest_first() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 100).await;
    let repo = SurrealLedgerRepository::new(db);

    let e1 = repo
        .record(sale("user-1", product.id, 1), GUARD)
        .await
        .unwrap();
    let e2 = repo
        .record(restock("user-1", product.id, 4), GUARD)
        .await
        .unwrap();
    let e3 = repo
        .record(sale("user-1", product.id, 2), GUARD)
        .await
        .unwrap();

    let page = repo
        .list("user-1", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![e3.entry.id, e2.entry.id, e1.entry.id]);

    // Listings carry the product's current name.
    assert!(page.items.iter().all(|r| r.product_name == "Widget"));
}

#[tokio::test]
async fn note_round_trips_through_listing() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 10).await;
    let repo = SurrealLedgerRepository::new(db);

    repo.record(
        RecordEntry {
            note: Some("damaged in transit".into()),
            ..sale("user-1", product.id, 2)
        },
        GUARD,
    )
    .await
    .unwrap();

    let page = repo
        .list("user-1", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].note.as_deref(), Some("damaged in transit"));
}

#[tokio::test]
async fn search_matches_product_name_and_note() {
    let db = setup().await;
    let widget = create_product(&db, "user-1", "Blue Widget", 50).await;
    let gadget = create_product(&db, "user-1", "Red Gadget", 50).await;
    let repo = SurrealLedgerRepository::new(db);

    repo.record(sale("user-1", widget.id, 1), GUARD)
        .await
        .unwrap();
    repo.record(
        RecordEntry {
            note: Some("URGENT reorder".into()),
            ..restock("user-1", gadget.id, 10)
        },
        GUARD,
    )
    .await
    .unwrap();
    repo.record(sale("user-1", gadget.id, 2), GUARD)
        .await
        .unwrap();

    // Match against the product name, case-insensitively.
    let page = repo
        .list(
            "user-1",
            LedgerFilter {
                search: Some("WIDGET".into()),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].product_id, widget.id);

    // Match against the note.
    let page = repo
        .list(
            "user-1",
            LedgerFilter {
                search: Some("urgent".into()),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].product_id, gadget.id);
    assert_eq!(page.items[0].kind, EntryKind::Restock);

    // No match.
    let page = repo
        .list(
            "user-1",
            LedgerFilter {
                search: Some("nothing like this".into()),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn date_range_bounds_are_inclusive() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 100).await;
    let repo = SurrealLedgerRepository::new(db);

    for _ in 0..3 {
        repo.record(sale("user-1", product.id, 1), GUARD)
            .await
            .unwrap();
    }

    // Newest first, so items[1] is the middle entry.
    let all = repo
        .list("user-1", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    let mid = all.items[1].created_at;

    let from_mid = repo
        .list(
            "user-1",
            LedgerFilter {
                from: Some(mid),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(from_mid.total, 2, "'from' bound should be inclusive");

    let to_mid = repo
        .list(
            "user-1",
            LedgerFilter {
                to: Some(mid),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(to_mid.total, 2, "'to' bound should be inclusive");

    let exactly_mid = repo
        .list(
            "user-1",
            LedgerFilter {
                from: Some(mid),
                to: Some(mid),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(exactly_mid.total, 1);
    assert_eq!(exactly_mid.items[0].created_at, mid);
}

#[tokio::test]
async fn deleted_product_shows_as_unknown() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Ephemeral", 10).await;
    let products = SurrealProductRepository::new(db.clone());
    let repo = SurrealLedgerRepository::new(db);

    repo.record(sale("user-1", product.id, 2), GUARD)
        .await
        .unwrap();

    products.delete("user-1", product.id).await.unwrap();

    // The entry outlives the product.
    let page = repo
        .list("user-1", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].product_id, product.id);
    assert_eq!(page.items[0].product_name, "Unknown Product");
}

#[tokio::test]
async fn listing_is_scoped_to_owner() {
    let db = setup().await;
    let mine = create_product(&db, "user-a", "Mine", 10).await;
    let theirs = create_product(&db, "user-b", "Theirs", 10).await;
    let repo = SurrealLedgerRepository::new(db);

    repo.record(sale("user-a", mine.id, 1), GUARD).await.unwrap();
    repo.record(sale("user-b", theirs.id, 1), GUARD)
        .await
        .unwrap();

    let page = repo
        .list("user-a", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].product_id, mine.id);
}

#[tokio::test]
async fn listing_pagination() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Widget", 100).await;
    let repo = SurrealLedgerRepository::new(db);

    for _ in 0..5 {
        repo.record(sale("user-1", product.id, 1), GUARD)
            .await
            .unwrap();
    }

    let page1 = repo
        .list(
            "user-1",
            LedgerFilter::default(),
            Pagination {
                offset: 0,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 2);
    assert_eq!(page1.total, 5);

    let page3 = repo
        .list(
            "user-1",
            LedgerFilter::default(),
            Pagination {
                offset: 4,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page3.items.len(), 1);
    assert_eq!(page3.total, 5);
}

// -----------------------------------------------------------------------
// Concurrency
// -----------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_serialize_without_lost_updates() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Hot Item", 100).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let repo = SurrealLedgerRepository::with_retry(db.clone(), RetryPolicy::immediate(20));
        let product_id = product.id;
        handles.push(tokio::spawn(async move {
            repo.record(sale("user-1", product_id, 3), GUARD)
                .await
                .unwrap()
        }));
    }

    let mut afters = Vec::new();
    for handle in handles {
        afters.push(handle.await.unwrap().stock_after);
    }

    // Every transaction saw a distinct intermediate quantity.
    afters.sort();
    let expected: Vec<i64> = (1..=10).map(|i| 100 - 3 * i).rev().collect();
    assert_eq!(afters, expected);

    let fetched = SurrealProductRepository::new(db.clone())
        .get("user-1", product.id)
        .await
        .unwrap();
    assert_eq!(fetched.quantity, 70);

    let page = SurrealLedgerRepository::new(db)
        .list("user-1", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_cannot_oversell_past_the_guard() {
    let db = setup().await;
    let product = create_product(&db, "user-1", "Scarce Item", 9).await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let repo = SurrealLedgerRepository::with_retry(db.clone(), RetryPolicy::immediate(20));
        let product_id = product.id;
        handles.push(tokio::spawn(async move {
            repo.record(sale("user-1", product_id, 3), GUARD).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(StockError::InsufficientStock { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    // Exactly three sales fit into an opening stock of nine.
    assert_eq!(successes, 3);

    let fetched = SurrealProductRepository::new(db.clone())
        .get("user-1", product.id)
        .await
        .unwrap();
    assert_eq!(fetched.quantity, 0);

    let page = SurrealLedgerRepository::new(db)
        .list("user-1", LedgerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 3);
}
