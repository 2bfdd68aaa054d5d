//! # Report Service
//!
//! Loads the catalog, orders and expenses and hands them to
//! `stota_core::report`. Reads only; never takes the Ledger lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::DbResult;
use crate::repository::expense::ExpenseRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use stota_core::report::{self, DailySales, PriceBasis, ProfitSummary, SalesByProduct, UnitsSold};
use stota_core::Money;

/// Units sold per product, by both methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitsReport {
    /// `max stock − stock`: the figure the profit summary uses.
    pub heuristic: BTreeMap<String, i64>,
    /// Summed from open order lines.
    pub from_orders: BTreeMap<String, i64>,
}

#[derive(Debug, Clone)]
pub struct ReportService {
    products: ProductRepository,
    orders: OrderRepository,
    expenses: ExpenseRepository,
}

impl ReportService {
    pub(crate) fn new(pool: SqlitePool, writer: Arc<Mutex<()>>) -> Self {
        ReportService {
            products: ProductRepository::new(pool.clone(), writer),
            orders: OrderRepository::new(pool.clone()),
            expenses: ExpenseRepository::new(pool),
        }
    }

    /// Income, sold-unit cost, expenses and net profit.
    pub async fn summary(&self) -> DbResult<ProfitSummary> {
        let products = self.products.list().await?;
        let orders = self.orders.list().await?;
        let expenses = self.expenses.list().await?;

        let summary = report::summarize(&products, &orders, &expenses);
        debug!(net_profit = %summary.net_profit, "Computed profit summary");
        Ok(summary)
    }

    pub async fn daily_sales(&self) -> DbResult<Vec<DailySales>> {
        let orders = self.orders.list().await?;
        Ok(report::daily_sales(&orders))
    }

    pub async fn sales_by_product(&self, basis: PriceBasis) -> DbResult<SalesByProduct> {
        let products = self.products.list().await?;
        let orders = self.orders.list().await?;

        let sales = report::sales_by_product(&products, &orders, basis);
        for product_id in &sales.missing_products {
            warn!(
                product_id = %product_id,
                "Product no longer in catalog; its order lines are left out"
            );
        }
        Ok(sales)
    }

    pub async fn sales_by_order(&self) -> DbResult<Vec<(String, Money)>> {
        let orders = self.orders.list().await?;
        Ok(report::sales_by_order(&orders))
    }

    pub async fn best_sellers(&self, limit: usize) -> DbResult<Vec<UnitsSold>> {
        let orders = self.orders.list().await?;
        Ok(report::best_sellers(&orders, limit))
    }

    pub async fn units_sold(&self) -> DbResult<UnitsReport> {
        let products = self.products.list().await?;
        let orders = self.orders.list().await?;

        Ok(UnitsReport {
            heuristic: report::units_sold_heuristic(&products),
            from_orders: report::units_sold_from_orders(&orders),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use stota_core::report::PriceBasis;
    use stota_core::{LineRequest, Money, ProductDraft};

    #[tokio::test]
    async fn test_reports_follow_the_ledger() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();
        products
            .add(&ProductDraft::new("P1", "Tea", Money::from_cents(400), Money::from_cents(1000), 5))
            .await
            .unwrap();
        products
            .add(&ProductDraft::new("P2", "Cake", Money::from_cents(100), Money::from_cents(300), 5))
            .await
            .unwrap();

        db.ledger()
            .create_order(&[LineRequest::new("P1", 2), LineRequest::new("P2", 1)])
            .await
            .unwrap();
        db.expenses().add(Money::from_cents(500), "rent").await.unwrap();

        let summary = db.reports().summary().await.unwrap();
        assert_eq!(summary.total_income.cents(), 2300);
        // max stock 4: Tea sold 1 by the heuristic, Cake sold 0
        assert_eq!(summary.sold_product_cost.cents(), 400);
        assert_eq!(summary.net_profit.cents(), 2300 - 400 - 500);

        let units = db.reports().units_sold().await.unwrap();
        assert_eq!(units.from_orders.get("P1"), Some(&2));
        assert_eq!(units.heuristic.get("P1"), Some(&1));

        let days = db.reports().daily_sales().await.unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].total.cents(), 2300);

        let by_product = db.reports().sales_by_product(PriceBasis::Captured).await.unwrap();
        assert_eq!(by_product.rows[0].product_id, "P1");

        let top = db.reports().best_sellers(1).await.unwrap();
        assert_eq!(top[0].units, 2);
        assert_eq!(db.reports().sales_by_order().await.unwrap().len(), 1);
    }
}
