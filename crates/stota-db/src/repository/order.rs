//! # Order Repository
//!
//! Read access to orders and the row-level writes the `Ledger` composes
//! into its transactions.
//!
//! ## Order Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  orders                        order_items                              │
//! │  ┌──────────────────────┐      ┌────────────────────────────────────┐  │
//! │  │ id  ORD20260131…     │◄─────│ order_id (ON DELETE CASCADE)       │  │
//! │  │ created_at           │      │ position   0, 1, 2 …               │  │
//! │  │ updated_at           │      │ product_id (no FK)                 │  │
//! │  │ total_cents          │      │ name_snapshot, unit_price_cents    │  │
//! │  └──────────────────────┘      │ quantity > 0                       │  │
//! │                                └────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are never written through this repository directly: every write
//! moves stock too, so it goes through `Ledger`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use stota_core::{LineItem, Order};

/// Prefix of every order id.
pub const ORDER_ID_PREFIX: &str = "ORD";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    total_cents: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItem>) -> Order {
        Order {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            total_cents: self.total_cents,
            items,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    order_id: String,
    #[sqlx(flatten)]
    item: LineItem,
}

/// Repository for reading orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its line items.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        fetch_in(&mut conn, id).await
    }

    /// All orders, oldest first, each with its line items.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, created_at, updated_at, total_cents FROM orders ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT order_id, product_id, name_snapshot, unit_price_cents, quantity
            FROM order_items
            ORDER BY order_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<String, Vec<LineItem>> = HashMap::new();
        for row in items {
            by_order.entry(row.order_id).or_default().push(row.item);
        }

        let orders: Vec<Order> = rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect();

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (used inside Ledger transactions)
// =============================================================================

pub(crate) async fn fetch_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, created_at, updated_at, total_cents FROM orders WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, LineItem>(
        r#"
        SELECT product_id, name_snapshot, unit_price_cents, quantity
        FROM order_items
        WHERE order_id = ?1
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(row.into_order(items)))
}

/// Picks an unused order id for `now`.
///
/// ## Format
/// ```text
/// ORD 20260131142501 123        ORD20260131142501123
///     └─YYYYMMDDHHMMSS └─ms     ORD20260131142501123-1   (on collision)
/// ```
pub(crate) async fn next_order_id_in(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let base = format!("{ORDER_ID_PREFIX}{}", now.format("%Y%m%d%H%M%S%3f"));

    let mut candidate = base.clone();
    let mut suffix = 0u32;
    while exists_in(conn, &candidate).await? {
        suffix += 1;
        candidate = format!("{base}-{suffix}");
    }
    Ok(candidate)
}

async fn exists_in(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Inserts an order header and its line items.
pub(crate) async fn insert_in(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(id = %order.id, items = order.items.len(), "Inserting order");

    sqlx::query(
        r#"
        INSERT INTO orders (id, created_at, updated_at, total_cents)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&order.id)
    .bind(order.created_at)
    .bind(order.updated_at)
    .bind(order.total_cents)
    .execute(&mut *conn)
    .await?;

    insert_items_in(conn, &order.id, &order.items).await
}

/// Replaces an order's line items and total, keeping `id` and `created_at`.
pub(crate) async fn replace_items_in(
    conn: &mut SqliteConnection,
    order_id: &str,
    items: &[LineItem],
    total_cents: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    debug!(id = %order_id, items = items.len(), total_cents, "Replacing order items");

    sqlx::query("UPDATE orders SET total_cents = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(order_id)
        .bind(total_cents)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    insert_items_in(conn, order_id, items).await
}

async fn insert_items_in(
    conn: &mut SqliteConnection,
    order_id: &str,
    items: &[LineItem],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, position, product_id,
                name_snapshot, unit_price_cents, quantity
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(order_id)
        .bind(position as i64)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Deletes an order; its items go with it (ON DELETE CASCADE).
pub(crate) async fn delete_in(conn: &mut SqliteConnection, order_id: &str) -> DbResult<()> {
    debug!(id = %order_id, "Deleting order");

    sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;

    fn sample(id: &str) -> Order {
        let at = Utc.with_ymd_and_hms(2026, 1, 31, 14, 25, 1).unwrap();
        Order {
            id: id.to_string(),
            created_at: at,
            updated_at: at,
            total_cents: 2500,
            items: vec![
                LineItem {
                    product_id: "P1".into(),
                    name_snapshot: "Tea".into(),
                    unit_price_cents: 1000,
                    quantity: 2,
                },
                LineItem {
                    product_id: "P2".into(),
                    name_snapshot: "Cake".into(),
                    unit_price_cents: 500,
                    quantity: 1,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_keeps_item_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        insert_in(&mut conn, &sample("ORD1")).await.unwrap();
        drop(conn);

        let order = db.orders().get("ORD1").await.unwrap().unwrap();
        assert_eq!(order, sample("ORD1"));
        assert_eq!(db.orders().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_order_id_format_and_collision() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 14, 25, 1).unwrap()
            + chrono::Duration::milliseconds(7);

        let first = next_order_id_in(&mut conn, now).await.unwrap();
        assert_eq!(first, "ORD20260131142501007");

        insert_in(&mut conn, &sample(&first)).await.unwrap();
        let second = next_order_id_in(&mut conn, now).await.unwrap();
        assert_eq!(second, "ORD20260131142501007-1");
    }

    #[tokio::test]
    async fn test_replace_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        insert_in(&mut conn, &sample("ORD1")).await.unwrap();

        let kept = vec![sample("ORD1").items[1].clone()];
        replace_items_in(&mut conn, "ORD1", &kept, 500, Utc::now())
            .await
            .unwrap();
        let order = fetch_in(&mut conn, "ORD1").await.unwrap().unwrap();
        assert_eq!(order.items, kept);
        assert_eq!(order.total_cents, 500);
        assert_eq!(order.created_at, sample("ORD1").created_at);

        delete_in(&mut conn, "ORD1").await.unwrap();
        assert!(fetch_in(&mut conn, "ORD1").await.unwrap().is_none());
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(items, 0);
    }
}
