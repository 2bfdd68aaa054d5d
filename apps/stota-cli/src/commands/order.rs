//! # Order Commands
//!
//! Every mutation goes through the `Ledger`, so stock and the order table
//! change together or not at all.

use serde::Serialize;

use super::Context;
use crate::cli::OrderCommand;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use stota_core::{CoreError, Order, RefundOutcome, RefundRequest};

#[derive(Serialize)]
struct Deleted<'a> {
    order_id: &'a str,
    deleted: bool,
}

pub async fn run(ctx: &Context, cmd: OrderCommand) -> AppResult<()> {
    let ledger = ctx.db.ledger();

    match cmd {
        OrderCommand::Create { lines } => {
            let order = ledger.create_order(&lines).await?;
            ctx.emit(&order, render_one)
        }
        OrderCommand::Edit { order_id, lines } => {
            let order = ledger.edit_order(&order_id, &lines).await?;
            ctx.emit(&order, render_one)
        }
        OrderCommand::Delete { order_id } => {
            ledger.delete_order(&order_id).await?;
            ctx.emit(
                &Deleted {
                    order_id: &order_id,
                    deleted: true,
                },
                |_, d| format!("Deleted order {}", d.order_id),
            )
        }
        OrderCommand::Refund { order_id, lines } => {
            let request = refund_request(lines)?;
            let outcome = ledger.refund_order(&order_id, &request).await?;
            ctx.emit(&outcome, render_refund)
        }
        OrderCommand::Show { order_id } => {
            let order = ctx
                .db
                .orders()
                .get(&order_id)
                .await?
                .ok_or_else(|| CoreError::OrderNotFound(order_id.clone()))?;
            ctx.emit(&order, render_one)
        }
        OrderCommand::List => {
            let orders = ctx.db.orders().list().await?;
            ctx.emit(orders.as_slice(), render_table)
        }
    }
}

/// Repeated products are summed.
fn refund_request(lines: Vec<(String, i64)>) -> AppResult<RefundRequest> {
    let mut request = RefundRequest::new();
    for (product_id, qty) in lines {
        let total = request.entry(product_id).or_insert(0);
        *total = total.checked_add(qty).ok_or_else(|| {
            AppError::InvalidArgument(format!("refund quantity {qty} is too large"))
        })?;
    }
    Ok(request)
}

fn render_one(config: &AppConfig, order: &Order) -> String {
    let mut out = format!(
        "{}  {}",
        order.id,
        order.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    for item in &order.items {
        out.push_str(&format!(
            "\n  {:<12} {:<24} {:>4} x {:>9} = {:>10}",
            item.product_id,
            item.name_snapshot,
            item.quantity,
            config.money(item.unit_price()),
            config.money(item.line_total())
        ));
    }
    out.push_str(&format!("\n  total {}", config.money(order.total())));
    out
}

fn render_table(config: &AppConfig, orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders".to_string();
    }

    let mut out = format!("{:<24} {:<19} {:>10}  {}", "ID", "CREATED", "TOTAL", "PRODUCTS");
    for order in orders {
        out.push_str(&format!(
            "\n{:<24} {:<19} {:>10}  {}",
            order.id,
            order.created_at.format("%Y-%m-%d %H:%M:%S"),
            config.money(order.total()),
            stota_core::line_items::format(&order.items)
        ));
    }
    out
}

fn render_refund(config: &AppConfig, outcome: &RefundOutcome) -> String {
    let mut out = format!(
        "Refunded {} on {}",
        config.money(outcome.refunded),
        outcome.order_id
    );
    match &outcome.order {
        Some(order) => out.push_str(&format!("\n{}", render_one(config, order))),
        None => out.push_str("\nNo lines left, order removed"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stota_core::Money;

    #[test]
    fn test_refund_request_sums_repeats() {
        let request = refund_request(vec![
            ("P1".into(), 1),
            ("P2".into(), 2),
            ("P1".into(), 2),
        ])
        .unwrap();
        assert_eq!(request.get("P1"), Some(&3));
        assert_eq!(request.get("P2"), Some(&2));
        assert_eq!(request.len(), 2);
    }

    #[test]
    fn test_refund_request_rejects_overflowing_sum() {
        let err = refund_request(vec![("P1".into(), i64::MAX), ("P1".into(), 1)]).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_render_removed_order_refund() {
        let outcome = RefundOutcome {
            order_id: "ORD1".into(),
            refunded: Money::from_cents(2000),
            order_removed: true,
            order: None,
        };
        let text = render_refund(&AppConfig::default(), &outcome);
        assert!(text.starts_with("Refunded 20.00 on ORD1"));
        assert!(text.ends_with("order removed"));
    }
}
