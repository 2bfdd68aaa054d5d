//! # Product Commands

use serde::Serialize;
use tracing::debug;

use super::Context;
use crate::cli::{ProductCommand, ProductFields};
use crate::config::AppConfig;
use crate::error::AppResult;
use stota_core::{CoreError, Product, ProductDraft};

#[derive(Serialize)]
struct Deleted<'a> {
    id: &'a str,
    deleted: bool,
}

#[derive(Serialize)]
struct StockLevel<'a> {
    id: &'a str,
    stock: i64,
}

impl From<ProductFields> for ProductDraft {
    fn from(f: ProductFields) -> Self {
        ProductDraft::new(f.id, f.name, f.cost, f.price, f.stock)
    }
}

pub async fn run(ctx: &Context, cmd: ProductCommand) -> AppResult<()> {
    let products = ctx.db.products();

    match cmd {
        ProductCommand::Add(fields) => {
            let product = products.add(&fields.into()).await?;
            ctx.emit(&product, render_one)
        }
        ProductCommand::Edit(fields) => {
            let product = products.edit(&fields.into()).await?;
            ctx.emit(&product, render_one)
        }
        ProductCommand::Delete { id } => {
            let deleted = products.delete(&id).await?;
            if !deleted {
                debug!(id = %id, "Product did not exist");
            }
            ctx.emit(&Deleted { id: &id, deleted }, |_, d| {
                if d.deleted {
                    format!("Deleted product {}", d.id)
                } else {
                    format!("No product {}", d.id)
                }
            })
        }
        ProductCommand::Restock { id, delta } => {
            let stock = ctx.db.ledger().adjust_stock(&id, delta).await?;
            ctx.emit(&StockLevel { id: &id, stock }, |_, s| {
                format!("{}: {} in stock", s.id, s.stock)
            })
        }
        ProductCommand::Show { id } => {
            let product = products
                .get(&id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(id.clone()))?;
            ctx.emit(&product, render_one)
        }
        ProductCommand::Find { name } => {
            let product = products.find(&name).await?;
            ctx.emit(&product, render_one)
        }
        ProductCommand::List => {
            let all = products.list().await?;
            ctx.emit(all.as_slice(), render_table)
        }
    }
}

fn render_one(config: &AppConfig, p: &Product) -> String {
    format!(
        "{}  {}\n  cost  {}\n  price {}\n  stock {}",
        p.id,
        p.name,
        config.money(p.cost()),
        config.money(p.price()),
        p.stock
    )
}

fn render_table(config: &AppConfig, products: &[Product]) -> String {
    if products.is_empty() {
        return "No products".to_string();
    }

    let mut out = format!("{:<12} {:<28} {:>10} {:>10} {:>7}", "ID", "NAME", "COST", "PRICE", "STOCK");
    for p in products {
        out.push_str(&format!(
            "\n{:<12} {:<28} {:>10} {:>10} {:>7}",
            p.id,
            p.name,
            config.money(p.cost()),
            config.money(p.price()),
            p.stock
        ));
    }
    out
}
