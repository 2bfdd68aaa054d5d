//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use stota_core::report::PriceBasis;
use stota_core::{LineRequest, Money};

#[derive(Parser, Debug)]
#[command(name = "stota", version, about = "Single-store point of sale: catalog, orders, expenses, reports")]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides config and STOTA_DB_PATH
    #[arg(long = "db", global = true)]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the product catalog
    #[command(subcommand)]
    Product(ProductCommand),

    /// Create, edit, delete and refund orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Manage the expense ledger
    #[command(subcommand)]
    Expense(ExpenseCommand),

    /// Profit and sales reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// Write a table as CSV
    Export(ExportArgs),
}

// =============================================================================
// Product
// =============================================================================

#[derive(Args, Debug)]
pub struct ProductFields {
    pub id: String,
    pub name: String,

    /// Cost per unit, e.g. 4.50
    #[arg(long, value_parser = parse_money)]
    pub cost: Money,

    /// Sale price per unit, e.g. 10.00
    #[arg(long, value_parser = parse_money)]
    pub price: Money,

    /// Units in stock
    #[arg(long, default_value_t = 0)]
    pub stock: i64,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// Add a product
    Add(ProductFields),
    /// Replace every field of a product except its id
    Edit(ProductFields),
    /// Remove a product (orders keep their snapshots)
    Delete { id: String },
    /// Add (or with a negative delta, remove) stock
    Restock {
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Show one product by id
    Show { id: String },
    /// First product with exactly this name
    Find { name: String },
    /// List all products
    List,
}

// =============================================================================
// Order
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Create an order from PRODUCT=QTY pairs
    Create {
        #[arg(required = true, value_parser = parse_line)]
        lines: Vec<LineRequest>,
    },
    /// Replace an order's lines
    Edit {
        order_id: String,
        #[arg(required = true, value_parser = parse_line)]
        lines: Vec<LineRequest>,
    },
    /// Delete an order and return its stock
    Delete { order_id: String },
    /// Refund PRODUCT=QTY pairs from an order
    Refund {
        order_id: String,
        #[arg(required = true, value_parser = parse_refund_line)]
        lines: Vec<(String, i64)>,
    },
    /// Show one order
    Show { order_id: String },
    /// List all orders
    List,
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    /// Record an expense
    Add {
        #[arg(value_parser = parse_money)]
        amount: Money,
        comment: String,
    },
    /// Change an expense's amount and comment
    Edit {
        id: i64,
        #[arg(value_parser = parse_money)]
        amount: Money,
        comment: String,
    },
    /// Delete an expense
    Delete { id: i64 },
    /// List expenses, newest first
    List,
}

// =============================================================================
// Report / Export
// =============================================================================

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Basis {
    /// Today's catalog price
    Current,
    /// Price captured on the order line
    Captured,
}

impl From<Basis> for PriceBasis {
    fn from(basis: Basis) -> Self {
        match basis {
            Basis::Current => PriceBasis::Current,
            Basis::Captured => PriceBasis::Captured,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Income, cost of sold units, expenses and net profit
    Summary,
    /// Sales per day (UTC)
    Daily,
    /// Sales grouped by product
    ByProduct {
        #[arg(long, value_enum, default_value_t = Basis::Current)]
        basis: Basis,
    },
    /// Total per order
    ByOrder,
    /// Products ranked by units on orders
    BestSellers {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Units sold per product: stock heuristic vs order lines
    Units,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Table {
    Products,
    Orders,
    Expenses,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub table: Table,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

// =============================================================================
// Value parsers
// =============================================================================

fn parse_money(s: &str) -> Result<Money, String> {
    s.parse::<Money>().map_err(|e| e.to_string())
}

fn split_pair(s: &str) -> Result<(String, i64), String> {
    let (id, qty) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PRODUCT=QTY, got '{s}'"))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not a whole number", qty.trim()))?;
    Ok((id.trim().to_string(), qty))
}

fn parse_line(s: &str) -> Result<LineRequest, String> {
    let (id, qty) = split_pair(s)?;
    Ok(LineRequest::new(id, qty))
}

fn parse_refund_line(s: &str) -> Result<(String, i64), String> {
    split_pair(s)
}
