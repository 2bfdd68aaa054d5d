//! # Command Handlers
//!
//! One module per subcommand group.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (Context, dispatch, output)
//! ├── product.rs  ◄─── Catalog CRUD, restock, lookup
//! ├── order.rs    ◄─── Create / edit / delete / refund through the Ledger
//! ├── expense.rs  ◄─── Expense ledger
//! └── report.rs   ◄─── Profit summary, sales breakdowns, CSV export
//! ```
//!
//! ## Output
//! Every handler prints either a short text rendering or, with `--json`,
//! the serialized result. Errors go back to `main` untouched.

pub mod expense;
pub mod order;
pub mod product;
pub mod report;

use serde::Serialize;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::error::AppResult;
use stota_db::Database;

/// What every handler gets to work with.
pub struct Context {
    pub db: Database,
    pub config: AppConfig,
    pub json: bool,
}

impl Context {
    /// Prints `value` as pretty JSON with `--json`, otherwise the text
    /// produced by `text`.
    pub fn emit<T, F>(&self, value: &T, text: F) -> AppResult<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&AppConfig, &T) -> String,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            let rendered = text(&self.config, value);
            if !rendered.is_empty() {
                println!("{rendered}");
            }
        }
        Ok(())
    }
}

pub async fn run(ctx: &Context, command: Command) -> AppResult<()> {
    match command {
        Command::Product(cmd) => product::run(ctx, cmd).await,
        Command::Order(cmd) => order::run(ctx, cmd).await,
        Command::Expense(cmd) => expense::run(ctx, cmd).await,
        Command::Report(cmd) => report::run(ctx, cmd).await,
        Command::Export(args) => report::export(ctx, args).await,
    }
}
