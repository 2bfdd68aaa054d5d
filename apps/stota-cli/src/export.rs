//! # CSV Export
//!
//! Writes the catalog, the orders or the expenses as CSV with a header row.
//! Amounts are decimal strings (`10.50`); the order `products` column keeps
//! the `"name: qty | name: qty"` layout of older exports.

use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::AppResult;
use stota_core::{line_items, Expense, Order, Product};

#[derive(Serialize)]
struct ProductRow<'a> {
    id: &'a str,
    name: &'a str,
    cost: String,
    price: String,
    stock: i64,
}

#[derive(Serialize)]
struct OrderRow<'a> {
    id: &'a str,
    created_at: String,
    products: String,
    total: String,
}

#[derive(Serialize)]
struct ExpenseRow<'a> {
    id: i64,
    created_at: String,
    amount: String,
    comment: &'a str,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn write_products<W: Write>(w: W, products: &[Product]) -> AppResult<()> {
    let mut wrt = WriterBuilder::new().from_writer(w);
    for p in products {
        wrt.serialize(ProductRow {
            id: &p.id,
            name: &p.name,
            cost: p.cost().to_string(),
            price: p.price().to_string(),
            stock: p.stock,
        })?;
    }
    wrt.flush()?;
    Ok(())
}

pub fn write_orders<W: Write>(w: W, orders: &[Order]) -> AppResult<()> {
    let mut wrt = WriterBuilder::new().from_writer(w);
    for o in orders {
        wrt.serialize(OrderRow {
            id: &o.id,
            created_at: o.created_at.format(TIMESTAMP_FORMAT).to_string(),
            products: line_items::format(&o.items),
            total: o.total().to_string(),
        })?;
    }
    wrt.flush()?;
    Ok(())
}

pub fn write_expenses<W: Write>(w: W, expenses: &[Expense]) -> AppResult<()> {
    let mut wrt = WriterBuilder::new().from_writer(w);
    for e in expenses {
        wrt.serialize(ExpenseRow {
            id: e.id,
            created_at: e.created_at.format(TIMESTAMP_FORMAT).to_string(),
            amount: e.amount().to_string(),
            comment: &e.comment,
        })?;
    }
    wrt.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stota_core::LineItem;

    #[test]
    fn test_orders_csv_keeps_legacy_products_column() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let orders = vec![Order {
            id: "ORD20260301093000000".into(),
            created_at: at,
            updated_at: at,
            total_cents: 3500,
            items: vec![
                LineItem {
                    product_id: "P1".into(),
                    name_snapshot: "Tea".into(),
                    unit_price_cents: 1000,
                    quantity: 3,
                },
                LineItem {
                    product_id: "P2".into(),
                    name_snapshot: "Cake".into(),
                    unit_price_cents: 500,
                    quantity: 1,
                },
            ],
        }];

        let mut out = Vec::new();
        write_orders(&mut out, &orders).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "id,created_at,products,total\n\
             ORD20260301093000000,2026-03-01 09:30:00,Tea: 3 | Cake: 1,35.00\n"
        );
    }

    #[test]
    fn test_products_and_expenses_have_headers() {
        let now = Utc::now();
        let products = vec![Product {
            id: "P1".into(),
            name: "Tea, green".into(),
            cost_cents: 400,
            price_cents: 1000,
            stock: 5,
            created_at: now,
            updated_at: now,
        }];
        let mut out = Vec::new();
        write_products(&mut out, &products).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("id,name,cost,price,stock\n"));
        assert!(text.contains("P1,\"Tea, green\",4.00,10.00,5"));

        let expenses = vec![Expense {
            id: 7,
            created_at: now,
            amount_cents: 1999,
            comment: "rent".into(),
        }];
        let mut out = Vec::new();
        write_expenses(&mut out, &expenses).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("id,created_at,amount,comment\n7,"));
        assert!(text.trim_end().ends_with(",19.99,rent"));
    }
}
