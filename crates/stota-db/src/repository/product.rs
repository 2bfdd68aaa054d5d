//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - add / edit / delete
//! - stock delta helpers used inside Ledger transactions
//! - lookup by id or exact name, full listing
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  Checked in Rust first (apply_stock_delta → InsufficientStock),    │
//! │  then written as a delta:                                          │
//! │     UPDATE products SET stock = stock + ?2 WHERE id = ?1           │
//! │                                                                     │
//! │  The CHECK (stock >= 0) column constraint is the last line: a      │
//! │  write that slipped past the check still cannot commit.            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stota_core::catalog::{apply_stock_delta, find_by_name};
use stota_core::{CoreError, Product, ProductDraft};

const PRODUCT_COLUMNS: &str = "id, name, cost_cents, price_cents, stock, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let tea = ProductDraft::new("P1", "Tea", Money::from_cents(400), Money::from_cents(1000), 5);
/// repo.add(&tea).await?;
///
/// let product = repo.get("P1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl ProductRepository {
    /// Creates a ProductRepository sharing the database's writer lock.
    pub(crate) fn new(pool: SqlitePool, writer: Arc<Mutex<()>>) -> Self {
        ProductRepository { pool, writer }
    }

    /// Adds a product to the catalog.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product
    /// * `Err(Domain(Validation))` - Blank id/name or a negative number
    /// * `Err(Domain(DuplicateId))` - The id is taken
    pub async fn add(&self, draft: &ProductDraft) -> DbResult<Product> {
        draft.validate()?;
        debug!(id = %draft.id, name = %draft.name, "Adding product");

        let _writer = self.writer.lock().await;
        let mut conn = self.pool.acquire().await?;
        if fetch_one_in(&mut conn, &draft.id).await?.is_some() {
            return Err(CoreError::DuplicateId {
                id: draft.id.clone(),
            }
            .into());
        }

        let now = Utc::now();
        let product = Product {
            id: draft.id.clone(),
            name: draft.name.clone(),
            cost_cents: draft.cost.cents(),
            price_cents: draft.price.cents(),
            stock: draft.stock,
            created_at: now,
            updated_at: now,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO products (id, name, cost_cents, price_cents, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *conn)
        .await;

        match inserted {
            Ok(_) => Ok(product),
            // Lost a race with another writer between the check and the insert
            Err(err) => match DbError::from(err) {
                DbError::UniqueViolation { .. } => Err(CoreError::DuplicateId {
                    id: product.id,
                }
                .into()),
                other => Err(other),
            },
        }
    }

    /// Replaces every field except `id`.
    ///
    /// No check is made against orders that sold this product; their line
    /// items keep the name and price they were written with.
    pub async fn edit(&self, draft: &ProductDraft) -> DbResult<Product> {
        draft.validate()?;
        debug!(id = %draft.id, "Editing product");

        let _writer = self.writer.lock().await;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                cost_cents = ?3,
                price_cents = ?4,
                stock = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&draft.id)
        .bind(&draft.name)
        .bind(draft.cost.cents())
        .bind(draft.price.cents())
        .bind(draft.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(draft.id.clone()).into());
        }

        self.get(&draft.id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(draft.id.clone()).into())
    }

    /// Removes a product. A no-op when it does not exist.
    ///
    /// ## Returns
    /// `true` if a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting product");

        let _writer = self.writer.lock().await;
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_one_in(&mut conn, id).await
    }

    /// First product with exactly this name.
    pub async fn find(&self, name: &str) -> DbResult<Product> {
        debug!(name = %name, "Finding product by name");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1 ORDER BY created_at, id"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(find_by_name(&products, name)?.clone())
    }

    /// All products, ordered by name then id.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (shared with the Ledger's transactions)
// =============================================================================

pub(crate) async fn fetch_one_in(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

/// Loads the products with the given ids. Missing ids are simply absent.
pub(crate) async fn fetch_many_in(
    conn: &mut SqliteConnection,
    ids: &[&str],
) -> DbResult<Vec<Product>> {
    let mut products = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(product) = fetch_one_in(conn, id).await? {
            products.push(product);
        }
    }
    Ok(products)
}

/// Checks and applies one stock delta on an open connection.
pub(crate) async fn adjust_stock_in(
    conn: &mut SqliteConnection,
    id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let product = fetch_one_in(conn, id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

    let stock = apply_stock_delta(&product.name, product.stock, delta)?;
    write_stock_delta_in(conn, id, delta, now).await?;

    debug!(id = %id, delta, stock, "Stock adjusted");
    Ok(stock)
}

/// Writes an already-validated delta.
pub(crate) async fn write_stock_delta_in(
    conn: &mut SqliteConnection,
    id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(delta)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
