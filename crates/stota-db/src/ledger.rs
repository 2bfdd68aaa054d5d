//! # Ledger
//!
//! The only path by which order line items and product stock change
//! together. Each operation is planned by `stota_core::inventory` and then
//! written inside one SQLite transaction.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger::create_order(lines)                          │
//! │                                                                         │
//! │  writer.lock()          ← one inventory operation at a time             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load touched products ──► CatalogSnapshot                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_create(snapshot, lines)                                           │
//! │       │                                                                 │
//! │       ├── Err ──► drop tx (ROLLBACK) ──► return error, nothing moved    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET stock = stock + Δ   (one per product)              │
//! │  INSERT orders / order_items                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edit, delete and refund follow the same shape with `plan_edit`,
//! `plan_delete` and `plan_refund`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{order, product};
use stota_core::inventory::{
    normalize_lines, plan_create, plan_delete, plan_edit, plan_refund, touched_products,
    CatalogSnapshot,
};
use stota_core::{CoreError, LineRequest, Order, RefundOutcome, RefundRequest};

/// Serialised writer for every stock-moving operation.
///
/// Clones share the same lock, so every handle obtained from one
/// `Database` is mutually exclusive.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl Ledger {
    pub(crate) fn new(pool: SqlitePool, writer: Arc<Mutex<()>>) -> Self {
        Ledger { pool, writer }
    }

    /// **Create**: decrement stock for every line and record a new order at
    /// current prices.
    ///
    /// ## Errors
    /// - `EmptyOrder`, `Validation` - bad input
    /// - `ProductNotFound` - a line names an unknown product
    /// - `InsufficientStock` - first line that cannot be filled
    ///
    /// On any error no stock has moved and no order exists.
    pub async fn create_order(&self, lines: &[LineRequest]) -> DbResult<Order> {
        let _writer = self.writer.lock().await;
        let lines = normalize_lines(lines)?;
        let mut tx = self.begin().await?;

        let snapshot = load_snapshot(&mut tx, touched_products(None, &lines)).await?;
        let plan = plan_create(&snapshot, &lines)?;

        let now = Utc::now();
        apply_deltas(&mut tx, &plan.stock_deltas, now).await?;

        let order = Order {
            id: order::next_order_id_in(&mut tx, now).await?,
            created_at: now,
            updated_at: now,
            total_cents: plan.total.cents(),
            items: plan.items,
        };
        order::insert_in(&mut tx, &order).await?;
        commit(tx).await?;

        info!(
            order_id = %order.id,
            total = %order.total(),
            lines = order.items.len(),
            "Order created"
        );
        Ok(order)
    }

    /// **Edit**: replace an order's lines. The old lines are returned to
    /// stock and the new ones taken out as one net change, so an infeasible
    /// edit leaves both the order and stock untouched.
    pub async fn edit_order(&self, order_id: &str, lines: &[LineRequest]) -> DbResult<Order> {
        let _writer = self.writer.lock().await;
        let mut tx = self.begin().await?;

        let existing = fetch_order(&mut tx, order_id).await?;
        let lines = normalize_lines(lines)?;

        let snapshot = load_snapshot(&mut tx, touched_products(Some(&existing), &lines)).await?;
        let plan = plan_edit(&snapshot, &existing, &lines)?;
        warn_skipped(&existing.id, &plan.skipped_reversals);

        let now = Utc::now();
        apply_deltas(&mut tx, &plan.stock_deltas, now).await?;
        order::replace_items_in(&mut tx, &existing.id, &plan.items, plan.total.cents(), now)
            .await?;
        commit(tx).await?;

        let order = Order {
            updated_at: now,
            total_cents: plan.total.cents(),
            items: plan.items,
            ..existing
        };

        info!(
            order_id = %order.id,
            total = %order.total(),
            lines = order.items.len(),
            "Order edited"
        );
        Ok(order)
    }

    /// **Delete**: return every line to stock, then remove the order.
    pub async fn delete_order(&self, order_id: &str) -> DbResult<()> {
        let _writer = self.writer.lock().await;
        let mut tx = self.begin().await?;

        let existing = fetch_order(&mut tx, order_id).await?;
        let snapshot = load_snapshot(&mut tx, touched_products(Some(&existing), &[])).await?;
        let plan = plan_delete(&snapshot, &existing)?;
        warn_skipped(&existing.id, &plan.skipped_reversals);

        apply_deltas(&mut tx, &plan.stock_deltas, Utc::now()).await?;
        order::delete_in(&mut tx, &existing.id).await?;
        commit(tx).await?;

        info!(order_id = %existing.id, total = %existing.total(), "Order deleted");
        Ok(())
    }

    /// **Refund**: return the requested units per product to stock and
    /// reduce the order at the unit prices it was sold at. The order is
    /// removed when no line remains.
    pub async fn refund_order(
        &self,
        order_id: &str,
        refund: &RefundRequest,
    ) -> DbResult<RefundOutcome> {
        let _writer = self.writer.lock().await;
        let mut tx = self.begin().await?;

        let existing = fetch_order(&mut tx, order_id).await?;
        let snapshot = load_snapshot(&mut tx, touched_products(Some(&existing), &[])).await?;
        let plan = plan_refund(&snapshot, &existing, refund)?;
        warn_skipped(&existing.id, &plan.skipped_reversals);

        let now = Utc::now();
        apply_deltas(&mut tx, &plan.stock_deltas, now).await?;

        let order = if plan.removes_order() {
            order::delete_in(&mut tx, &existing.id).await?;
            None
        } else {
            order::replace_items_in(
                &mut tx,
                &existing.id,
                &plan.remaining,
                plan.new_total.cents(),
                now,
            )
            .await?;
            Some(Order {
                updated_at: now,
                total_cents: plan.new_total.cents(),
                items: plan.remaining,
                ..existing.clone()
            })
        };
        commit(tx).await?;

        let outcome = RefundOutcome {
            order_id: existing.id,
            refunded: plan.refunded,
            order_removed: order.is_none(),
            order,
        };

        info!(
            order_id = %outcome.order_id,
            refunded = %outcome.refunded,
            order_removed = outcome.order_removed,
            "Order refunded"
        );
        Ok(outcome)
    }

    /// Restocks (positive delta) or writes off (negative delta) a product
    /// under the writer lock. Returns the new stock.
    pub async fn adjust_stock(&self, product_id: &str, delta: i64) -> DbResult<i64> {
        let _writer = self.writer.lock().await;
        let mut tx = self.begin().await?;

        let stock = product::adjust_stock_in(&mut tx, product_id, delta, Utc::now()).await?;
        commit(tx).await?;

        info!(product_id = %product_id, delta, stock, "Stock adjusted");
        Ok(stock)
    }

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

async fn fetch_order(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Order> {
    order::fetch_in(conn, order_id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
}

async fn load_snapshot(conn: &mut SqliteConnection, ids: Vec<&str>) -> DbResult<CatalogSnapshot> {
    let products = product::fetch_many_in(conn, &ids).await?;
    debug!(requested = ids.len(), loaded = products.len(), "Loaded stock snapshot");
    Ok(CatalogSnapshot::new(products))
}

async fn apply_deltas(
    conn: &mut SqliteConnection,
    deltas: &BTreeMap<String, i64>,
    now: DateTime<Utc>,
) -> DbResult<()> {
    for (product_id, delta) in deltas {
        product::write_stock_delta_in(conn, product_id, *delta, now).await?;
    }
    Ok(())
}

fn warn_skipped(order_id: &str, skipped: &[String]) {
    for product_id in skipped {
        warn!(
            order_id = %order_id,
            product_id = %product_id,
            "Product no longer in catalog; stock return skipped"
        );
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
