//! # Reporting
//!
//! Read-only aggregation over the catalog and the ledger. Everything is
//! recomputed from the rows passed in; nothing is cached.
//!
//! ## Profit Summary
//! ```text
//! total_income       = Σ order.total
//! units_sold(p)      = max(stock over all products) − p.stock      (heuristic)
//! sold_product_cost  = Σ p.cost × units_sold(p)
//! total_expenses     = Σ expense.amount
//! net_profit         = total_income − sold_product_cost − total_expenses
//! ```
//!
//! `units_sold` by max-stock is only meaningful when every product started
//! with the same stock and was never restocked. It is kept as the reported
//! figure; [`units_sold_from_orders`] gives the ledger-derived count next to
//! it for comparison.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Expense, Order, Product};

// =============================================================================
// Profit
// =============================================================================

/// Headline figures for the insights view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSummary {
    pub total_income: Money,
    pub sold_product_cost: Money,
    pub total_expenses: Money,
    pub net_profit: Money,
}

/// Units sold per product id by the max-stock heuristic.
pub fn units_sold_heuristic(products: &[Product]) -> BTreeMap<String, i64> {
    let max_stock = products.iter().map(|p| p.stock).max().unwrap_or(0);
    products
        .iter()
        .map(|p| (p.id.clone(), max_stock - p.stock))
        .collect()
}

pub fn total_income(orders: &[Order]) -> Money {
    orders.iter().map(Order::total).sum()
}

pub fn total_expenses(expenses: &[Expense]) -> Money {
    expenses.iter().map(Expense::amount).sum()
}

/// Σ cost × heuristic units sold.
pub fn sold_product_cost(products: &[Product]) -> Money {
    let units = units_sold_heuristic(products);
    products
        .iter()
        .map(|p| p.cost() * units.get(&p.id).copied().unwrap_or(0))
        .sum()
}

pub fn summarize(products: &[Product], orders: &[Order], expenses: &[Expense]) -> ProfitSummary {
    let total_income = total_income(orders);
    let sold_product_cost = sold_product_cost(products);
    let total_expenses = total_expenses(expenses);

    ProfitSummary {
        total_income,
        sold_product_cost,
        total_expenses,
        net_profit: total_income - sold_product_cost - total_expenses,
    }
}

// =============================================================================
// Sales Breakdown
// =============================================================================

/// Sales total for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: Money,
    pub orders: usize,
}

/// Order totals grouped by the UTC date of `created_at`, oldest day first.
pub fn daily_sales(orders: &[Order]) -> Vec<DailySales> {
    let mut by_day: BTreeMap<NaiveDate, (Money, usize)> = BTreeMap::new();
    for order in orders {
        let entry = by_day
            .entry(order.created_at.date_naive())
            .or_insert((Money::zero(), 0));
        entry.0 += order.total();
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (total, orders))| DailySales { date, total, orders })
        .collect()
}

/// Which price a sales-by-product row multiplies quantities by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// The product's price today. Drifts when products are repriced.
    #[default]
    Current,
    /// The unit price captured on the order line.
    Captured,
}

/// Revenue attributed to one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: String,
    pub name: String,
    pub units: i64,
    pub revenue: Money,
}

/// Sales grouped by product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesByProduct {
    /// Rows ordered by revenue, highest first, then by name.
    pub rows: Vec<ProductSales>,
    /// Product ids on orders that no longer exist in the catalog. Their
    /// lines are left out of a `Current` basis report.
    pub missing_products: Vec<String>,
}

pub fn sales_by_product(products: &[Product], orders: &[Order], basis: PriceBasis) -> SalesByProduct {
    let catalog: BTreeMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut grouped: BTreeMap<String, ProductSales> = BTreeMap::new();
    let mut missing: Vec<String> = Vec::new();

    for item in orders.iter().flat_map(|o| o.items.iter()) {
        let current = catalog.get(item.product_id.as_str());
        let (name, unit_price) = match (basis, current) {
            (PriceBasis::Current, Some(product)) => (product.name.clone(), product.price()),
            (PriceBasis::Current, None) => {
                if !missing.contains(&item.product_id) {
                    missing.push(item.product_id.clone());
                }
                continue;
            }
            (PriceBasis::Captured, Some(product)) => (product.name.clone(), item.unit_price()),
            (PriceBasis::Captured, None) => (item.name_snapshot.clone(), item.unit_price()),
        };

        let row = grouped
            .entry(item.product_id.clone())
            .or_insert_with(|| ProductSales {
                product_id: item.product_id.clone(),
                name,
                units: 0,
                revenue: Money::zero(),
            });
        row.units += item.quantity;
        row.revenue += unit_price * item.quantity;
    }

    let mut rows: Vec<ProductSales> = grouped.into_values().collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));

    SalesByProduct {
        rows,
        missing_products: missing,
    }
}

/// `(order id, total)` for every order, in the order given.
pub fn sales_by_order(orders: &[Order]) -> Vec<(String, Money)> {
    orders.iter().map(|o| (o.id.clone(), o.total())).collect()
}

// =============================================================================
// Units
// =============================================================================

/// Units on open orders per product id, summed from the order lines.
pub fn units_sold_from_orders(orders: &[Order]) -> BTreeMap<String, i64> {
    let mut units = BTreeMap::new();
    for item in orders.iter().flat_map(|o| o.items.iter()) {
        *units.entry(item.product_id.clone()).or_insert(0) += item.quantity;
    }
    units
}

/// A best-seller ranking row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsSold {
    pub product_id: String,
    pub name: String,
    pub units: i64,
}

/// Products ranked by units on open orders, most first.
///
/// The name is the most recent snapshot seen on an order line.
pub fn best_sellers(orders: &[Order], limit: usize) -> Vec<UnitsSold> {
    let mut ranked: BTreeMap<String, UnitsSold> = BTreeMap::new();
    for item in orders.iter().flat_map(|o| o.items.iter()) {
        let row = ranked
            .entry(item.product_id.clone())
            .or_insert_with(|| UnitsSold {
                product_id: item.product_id.clone(),
                name: item.name_snapshot.clone(),
                units: 0,
            });
        row.name = item.name_snapshot.clone();
        row.units += item.quantity;
    }

    let mut rows: Vec<UnitsSold> = ranked.into_values().collect();
    rows.sort_by(|a, b| b.units.cmp(&a.units).then_with(|| a.name.cmp(&b.name)));
    rows.truncate(limit);
    rows
}

// =============================================================================
// Unit Tests
// =============================================================================
