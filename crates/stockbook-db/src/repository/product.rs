//! SurrealDB implementation of [`ProductRepository`].
//!
//! Product ids are ints allocated from the `counter` table inside the same
//! transaction that creates the row, so ids are compact and monotonically
//! increasing.

use chrono::{DateTime, Utc};
use stockbook_core::error::StockResult;
use stockbook_core::models::product::{CreateProduct, Product, UpdateProduct};
use stockbook_core::repository::{PaginatedResult, Pagination, ProductRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;
use crate::retry::RetryPolicy;

/// DB-side row struct for queries where the numeric id is already known.
#[derive(Debug, SurrealValue)]
struct ProductRow {
    owner_id: String,
    name: String,
    description: Option<String>,
    quantity: i64,
    price: i64,
    cost: i64,
    low_stock_threshold: i64,
    tags: Vec<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProductRowWithId {
    record_id: i64,
    owner_id: String,
    name: String,
    description: Option<String>,
    quantity: i64,
    price: i64,
    cost: i64,
    low_stock_threshold: i64,
    tags: Vec<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, id: i64) -> Product {
        Product {
            id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            price: self.price,
            cost: self.cost,
            low_stock_threshold: self.low_stock_threshold,
            tags: self.tags,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ProductRowWithId {
    fn into_product(self) -> Product {
        Product {
            id: self.record_id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            price: self.price,
            cost: self.cost,
            low_stock_threshold: self.low_stock_threshold,
            tags: self.tags,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Product repository.
#[derive(Clone)]
pub struct SurrealProductRepository<C: Connection> {
    db: Surreal<C>,
    retry: RetryPolicy,
}

impl<C: Connection> SurrealProductRepository<C> {
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

impl<C: Connection> ProductRepository for SurrealProductRepository<C> {
    async fn create(&self, input: CreateProduct) -> StockResult<Product> {
        let row = self.retry.run(|| create_product(&self.db, &input)).await?;
        Ok(row.into_product())
    }

    async fn get(&self, owner_id: &str, id: i64) -> StockResult<Product> {
        let row = self.retry.run(|| get_product(&self.db, owner_id, id)).await?;
        Ok(row.into_product(id))
    }

    async fn update(&self, owner_id: &str, id: i64, input: UpdateProduct) -> StockResult<Product> {
        let row = self
            .retry
            .run(|| update_product(&self.db, owner_id, id, &input))
            .await?;
        Ok(row.into_product(id))
    }

    async fn delete(&self, owner_id: &str, id: i64) -> StockResult<()> {
        self.retry
            .run(|| delete_product(&self.db, owner_id, id))
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        owner_id: &str,
        pagination: Pagination,
    ) -> StockResult<PaginatedResult<Product>> {
        let (total, rows) = self
            .retry
            .run(|| list_page(&self.db, owner_id, &pagination))
            .await?;

        Ok(PaginatedResult {
            items: rows.into_iter().map(ProductRowWithId::into_product).collect(),
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_all(&self, owner_id: &str) -> StockResult<Vec<Product>> {
        let rows = self.retry.run(|| list_all_rows(&self.db, owner_id)).await?;
        Ok(rows.into_iter().map(ProductRowWithId::into_product).collect())
    }
}

async fn create_product<C: Connection>(
    db: &Surreal<C>,
    input: &CreateProduct,
) -> Result<ProductRowWithId, DbError> {
    let result = db
        .query(
            "BEGIN TRANSACTION; \
             LET $id = (UPSERT ONLY counter:product SET value += 1).value; \
             LET $created = (CREATE ONLY type::record('product', $id) SET \
                 owner_id = $owner_id, \
                 name = $name, \
                 description = $description, \
                 quantity = $quantity, \
                 price = $price, \
                 cost = $cost, \
                 low_stock_threshold = $low_stock_threshold, \
                 tags = $tags, \
                 image_url = $image_url); \
             RETURN (SELECT meta::id(id) AS record_id, * FROM ONLY $created); \
             COMMIT TRANSACTION;",
        )
        .bind(("owner_id", input.owner_id.clone()))
        .bind(("name", input.name.clone()))
        .bind(("description", input.description.clone()))
        .bind(("quantity", input.quantity))
        .bind(("price", input.price))
        .bind(("cost", input.cost))
        .bind(("low_stock_threshold", input.low_stock_threshold))
        .bind(("tags", input.tags.clone()))
        .bind(("image_url", input.image_url.clone()))
        .await?;

    let mut result = result.check()?;

    // Statement results: 0 = BEGIN, 1-2 = LETs, 3 = RETURN, 4 = COMMIT.
    let row: Option<ProductRowWithId> = result.take(3)?;
    row.ok_or_else(|| DbError::Permanent("product create returned no row".into()))
}

async fn get_product<C: Connection>(
    db: &Surreal<C>,
    owner_id: &str,
    id: i64,
) -> Result<ProductRow, DbError> {
    let mut result = db
        .query(
            "SELECT * FROM type::record('product', $id) \
             WHERE owner_id = $owner_id",
        )
        .bind(("id", id))
        .bind(("owner_id", owner_id.to_string()))
        .await?;

    let rows: Vec<ProductRow> = result.take(0)?;
    rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: "product".into(),
        id: id.to_string(),
    })
}

async fn update_product<C: Connection>(
    db: &Surreal<C>,
    owner_id: &str,
    id: i64,
    input: &UpdateProduct,
) -> Result<ProductRow, DbError> {
    let mut sets = Vec::new();
    if input.name.is_some() {
        sets.push("name = $name");
    }
    if input.description.is_some() {
        sets.push("description = $description");
    }
    if input.price.is_some() {
        sets.push("price = $price");
    }
    if input.cost.is_some() {
        sets.push("cost = $cost");
    }
    if input.low_stock_threshold.is_some() {
        sets.push("low_stock_threshold = $low_stock_threshold");
    }
    if input.tags.is_some() {
        sets.push("tags = $tags");
    }
    if input.image_url.is_some() {
        sets.push("image_url = $image_url");
    }
    sets.push("updated_at = time::now()");

    let query = format!(
        "UPDATE type::record('product', $id) SET {} \
         WHERE owner_id = $owner_id",
        sets.join(", ")
    );

    let mut builder = db
        .query(&query)
        .bind(("id", id))
        .bind(("owner_id", owner_id.to_string()));

    if let Some(name) = &input.name {
        builder = builder.bind(("name", name.clone()));
    }
    if let Some(description) = &input.description {
        builder = builder.bind(("description", description.clone()));
    }
    if let Some(price) = input.price {
        builder = builder.bind(("price", price));
    }
    if let Some(cost) = input.cost {
        builder = builder.bind(("cost", cost));
    }
    if let Some(threshold) = input.low_stock_threshold {
        builder = builder.bind(("low_stock_threshold", threshold));
    }
    if let Some(tags) = &input.tags {
        builder = builder.bind(("tags", tags.clone()));
    }
    if let Some(image_url) = &input.image_url {
        builder = builder.bind(("image_url", image_url.clone()));
    }

    let result = builder.await?;
    let mut result = result.check()?;

    let rows: Vec<ProductRow> = result.take(0)?;
    rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: "product".into(),
        id: id.to_string(),
    })
}

async fn delete_product<C: Connection>(
    db: &Surreal<C>,
    owner_id: &str,
    id: i64,
) -> Result<(), DbError> {
    let mut result = db
        .query(
            "DELETE type::record('product', $id) \
             WHERE owner_id = $owner_id RETURN BEFORE",
        )
        .bind(("id", id))
        .bind(("owner_id", owner_id.to_string()))
        .await?;

    let rows: Vec<ProductRow> = result.take(0)?;
    if rows.is_empty() {
        return Err(DbError::NotFound {
            entity: "product".into(),
            id: id.to_string(),
        });
    }

    Ok(())
}

async fn list_page<C: Connection>(
    db: &Surreal<C>,
    owner_id: &str,
    pagination: &Pagination,
) -> Result<(u64, Vec<ProductRowWithId>), DbError> {
    let mut count_result = db
        .query(
            "SELECT count() AS total FROM product \
             WHERE owner_id = $owner_id GROUP ALL",
        )
        .bind(("owner_id", owner_id.to_string()))
        .await?;
    let count_rows: Vec<CountRow> = count_result.take(0)?;
    let total = count_rows.first().map(|r| r.total).unwrap_or(0);

    let mut result = db
        .query(
            "SELECT meta::id(id) AS record_id, * FROM product \
             WHERE owner_id = $owner_id \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset",
        )
        .bind(("owner_id", owner_id.to_string()))
        .bind(("limit", pagination.limit))
        .bind(("offset", pagination.offset))
        .await?;

    let rows: Vec<ProductRowWithId> = result.take(0)?;
    Ok((total, rows))
}

async fn list_all_rows<C: Connection>(
    db: &Surreal<C>,
    owner_id: &str,
) -> Result<Vec<ProductRowWithId>, DbError> {
    let mut result = db
        .query(
            "SELECT meta::id(id) AS record_id, * FROM product \
             WHERE owner_id = $owner_id \
             ORDER BY updated_at DESC",
        )
        .bind(("owner_id", owner_id.to_string()))
        .await?;

    let rows: Vec<ProductRowWithId> = result.take(0)?;
    Ok(rows)
}
