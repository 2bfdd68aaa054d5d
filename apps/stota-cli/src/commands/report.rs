//! # Report and Export Commands

use std::fs::File;
use std::io::{self, BufWriter, Write};

use serde::Serialize;
use tracing::info;

use super::Context;
use crate::cli::{ExportArgs, ReportCommand, Table};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::export;
use stota_core::report::{DailySales, ProfitSummary, SalesByProduct, UnitsSold};
use stota_core::{Expense, Money, Order, Product};
use stota_db::UnitsReport;

#[derive(Serialize)]
struct OrderTotal {
    order_id: String,
    total: Money,
}

pub async fn run(ctx: &Context, cmd: ReportCommand) -> AppResult<()> {
    let reports = ctx.db.reports();

    match cmd {
        ReportCommand::Summary => {
            let summary = reports.summary().await?;
            ctx.emit(&summary, render_summary)
        }
        ReportCommand::Daily => {
            let days = reports.daily_sales().await?;
            ctx.emit(days.as_slice(), render_daily)
        }
        ReportCommand::ByProduct { basis } => {
            let sales = reports.sales_by_product(basis.into()).await?;
            ctx.emit(&sales, render_by_product)
        }
        ReportCommand::ByOrder => {
            let totals: Vec<OrderTotal> = reports
                .sales_by_order()
                .await?
                .into_iter()
                .map(|(order_id, total)| OrderTotal { order_id, total })
                .collect();
            ctx.emit(totals.as_slice(), |config, totals| {
                totals
                    .iter()
                    .map(|t| format!("{:<24} {:>10}", t.order_id, config.money(t.total)))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        ReportCommand::BestSellers { limit } => {
            let ranked = reports.best_sellers(limit).await?;
            ctx.emit(ranked.as_slice(), render_best_sellers)
        }
        ReportCommand::Units => {
            let units = reports.units_sold().await?;
            ctx.emit(&units, render_units)
        }
    }
}

/// Writes one table as CSV to `--output` or stdout.
pub async fn export(ctx: &Context, args: ExportArgs) -> AppResult<()> {
    // Load before opening the output so a failed query leaves no empty file.
    let table = match args.table {
        Table::Products => Rows::Products(ctx.db.products().list().await?),
        Table::Orders => Rows::Orders(ctx.db.orders().list().await?),
        Table::Expenses => Rows::Expenses(ctx.db.expenses().list().await?),
    };

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let rows = match &table {
        Rows::Products(products) => {
            export::write_products(out, products)?;
            products.len()
        }
        Rows::Orders(orders) => {
            export::write_orders(out, orders)?;
            orders.len()
        }
        Rows::Expenses(expenses) => {
            export::write_expenses(out, expenses)?;
            expenses.len()
        }
    };

    if let Some(path) = &args.output {
        info!(?path, table = ?args.table, rows, "Exported CSV");
    }
    Ok(())
}

enum Rows {
    Products(Vec<Product>),
    Orders(Vec<Order>),
    Expenses(Vec<Expense>),
}

fn render_summary(config: &AppConfig, s: &ProfitSummary) -> String {
    format!(
        "{}\n  income            {:>12}\n  cost of sold units {:>11}\n  expenses          {:>12}\n  net profit        {:>12}",
        config.store.name,
        config.money(s.total_income),
        config.money(s.sold_product_cost),
        config.money(s.total_expenses),
        config.money(s.net_profit)
    )
}

fn render_daily(config: &AppConfig, days: &[DailySales]) -> String {
    if days.is_empty() {
        return "No sales".to_string();
    }
    days.iter()
        .map(|d| format!("{}  {:>4} orders  {:>12}", d.date, d.orders, config.money(d.total)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_by_product(config: &AppConfig, sales: &SalesByProduct) -> String {
    let mut out = format!("{:<12} {:<28} {:>6} {:>12}", "ID", "NAME", "UNITS", "REVENUE");
    for row in &sales.rows {
        out.push_str(&format!(
            "\n{:<12} {:<28} {:>6} {:>12}",
            row.product_id,
            row.name,
            row.units,
            config.money(row.revenue)
        ));
    }
    if !sales.missing_products.is_empty() {
        out.push_str(&format!(
            "\nnot in catalog: {}",
            sales.missing_products.join(", ")
        ));
    }
    out
}

fn render_best_sellers(_: &AppConfig, ranked: &[UnitsSold]) -> String {
    if ranked.is_empty() {
        return "No sales".to_string();
    }
    ranked
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{:>3}. {:<12} {:<28} {:>6}", i + 1, r.product_id, r.name, r.units))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_units(_: &AppConfig, units: &UnitsReport) -> String {
    let mut out = format!("{:<12} {:>10} {:>10}", "ID", "BY STOCK", "BY ORDERS");
    let ids = units.heuristic.keys().chain(
        units
            .from_orders
            .keys()
            .filter(|id| !units.heuristic.contains_key(*id)),
    );
    for id in ids {
        let heuristic = units
            .heuristic
            .get(id)
            .map(i64::to_string)
            .unwrap_or_else(|| "-".to_string());
        let from_orders = units.from_orders.get(id).copied().unwrap_or(0);
        out.push_str(&format!("\n{:<12} {:>10} {:>10}", id, heuristic, from_orders));
    }
    out
}
