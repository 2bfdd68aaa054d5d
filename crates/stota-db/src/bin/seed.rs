//! # Seed Data Generator
//!
//! Populates a database with a sample catalog, and optionally a few orders
//! and expenses, for development.
//!
//! ## Usage
//! ```bash
//! # Generate 60 products (default)
//! cargo run -p stota-db --bin seed
//!
//! # Custom amount, plus 20 sample orders
//! cargo run -p stota-db --bin seed -- --count 100 --orders 20
//!
//! # Specify database path
//! cargo run -p stota-db --bin seed -- --db ./data/stota.db
//! ```
//!
//! ## Generated Products
//! - Id: `{CATEGORY}-{INDEX:03}`
//! - Name: `{item} {size}`
//! - Price: 1.50 - 9.49 plus a size addon; cost 50-70% of price
//! - Stock: 20 - 59

use std::env;

use stota_core::{LineRequest, Money, ProductDraft};
use stota_db::{Database, DbConfig};

/// Product categories for sample data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "HOT",
        &["Espresso", "Americano", "Latte", "Cappuccino", "Tea", "Hot Chocolate"],
    ),
    (
        "CLD",
        &["Iced Latte", "Lemonade", "Orange Juice", "Mineral Water", "Iced Tea"],
    ),
    (
        "BAK",
        &["Croissant", "Muffin", "Cheesecake", "Brownie", "Cookie", "Banana Bread"],
    ),
    (
        "SNK",
        &["Crisps", "Granola Bar", "Mixed Nuts", "Fruit Cup"],
    ),
];

/// Size variants with their price addon in cents
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Regular", 50), ("Large", 100)];

/// Sample expenses recorded with `--orders`
const EXPENSES: &[(i64, &str)] = &[
    (120_000, "Rent"),
    (18_500, "Electricity"),
    (9_900, "Cleaning supplies"),
];

struct SeedArgs {
    count: usize,
    orders: usize,
    db_path: String,
}

fn parse_args() -> Option<SeedArgs> {
    let args: Vec<String> = env::args().collect();

    let mut parsed = SeedArgs {
        count: 60,
        orders: 0,
        db_path: String::from("./stota_dev.db"),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    parsed.count = value.parse().unwrap_or(parsed.count);
                    i += 1;
                }
            }
            "--orders" | "-o" => {
                if let Some(value) = args.get(i + 1) {
                    parsed.orders = value.parse().unwrap_or(parsed.orders);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    parsed.db_path = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stota POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -o, --orders <N>   Number of sample orders to record (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./stota_dev.db)");
                println!("  -h, --help         Show this help message");
                return None;
            }
            _ => {}
        }
        i += 1;
    }

    Some(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = parse_args() else {
        return Ok(());
    };

    println!("🌱 Stota POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", args.db_path);
    println!("Products: {}", args.count);
    println!("Orders:   {}", args.orders);
    println!();

    let db = Database::new(DbConfig::new(&args.db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let drafts = generate_catalog(args.count);
    let mut ids = Vec::with_capacity(drafts.len());

    for draft in &drafts {
        if let Err(e) = db.products().add(draft).await {
            eprintln!("Failed to insert {}: {}", draft.id, e);
            continue;
        }
        ids.push(draft.id.clone());
    }

    println!("✓ Generated {} products in {:?}", ids.len(), start.elapsed());

    if args.orders > 0 && !ids.is_empty() {
        println!();
        println!("Recording sample orders...");

        let ledger = db.ledger();
        let mut recorded = 0;
        for n in 0..args.orders {
            let lines = sample_lines(&ids, n);
            match ledger.create_order(&lines).await {
                Ok(_) => recorded += 1,
                Err(e) => eprintln!("  Order {} skipped: {}", n + 1, e),
            }
        }
        println!("✓ Recorded {} orders", recorded);

        for (cents, comment) in EXPENSES {
            db.expenses().add(Money::from_cents(*cents), comment).await?;
        }
        println!("✓ Recorded {} expenses", EXPENSES.len());

        let summary = db.reports().summary().await?;
        println!();
        println!("  Income:   {}", summary.total_income);
        println!("  Expenses: {}", summary.total_expenses);
        println!("  Net:      {}", summary.net_profit);
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds up to `count` product drafts across every category and size.
fn generate_catalog(count: usize) -> Vec<ProductDraft> {
    let mut drafts = Vec::with_capacity(count);

    for (category, items) in CATEGORIES {
        for item in items.iter() {
            for (size, price_addon) in SIZES {
                if drafts.len() >= count {
                    return drafts;
                }
                let seed = drafts.len();
                drafts.push(generate_product(category, item, size, *price_addon, seed));
            }
        }
    }

    drafts
}

/// Generates a single product with deterministic pseudo-random numbers.
fn generate_product(
    category: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> ProductDraft {
    // Price: base 1.50 - 9.49 + size addon
    let base_price = 150 + ((seed * 37) % 800) as i64;
    let price_cents = base_price + price_addon;

    // Cost: 50-70% of price
    let cost_pct = 50 + (seed % 21) as i64;
    let cost_cents = price_cents * cost_pct / 100;

    let stock = 20 + (seed % 40) as i64;

    ProductDraft::new(
        format!("{}-{:03}", category, seed),
        format!("{} {}", name, size),
        Money::from_cents(cost_cents),
        Money::from_cents(price_cents),
        stock,
    )
}

/// One to three lines drawn deterministically from the catalog.
fn sample_lines(ids: &[String], n: usize) -> Vec<LineRequest> {
    let line_count = 1 + n % 3;
    (0..line_count)
        .map(|k| {
            let id = &ids[(n * 7 + k * 13) % ids.len()];
            LineRequest::new(id.clone(), 1 + ((n + k) % 3) as i64)
        })
        .collect()
}
