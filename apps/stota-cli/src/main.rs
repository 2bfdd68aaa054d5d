//! # Stota CLI
//!
//! Operator front end for the point of sale.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Startup Flow                                    │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  2. Load config (file → STOTA_* env → --db)                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  3. Initialize tracing (stderr, RUST_LOG or logging.filter)            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  4. Open SQLite, run migrations                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  5. Run the command, print the result                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  6. Close the pool; exit 0, or 1/2 on error                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;
mod config;
mod error;
mod export;

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use commands::Context;
use config::AppConfig;
use error::AppResult;
use stota_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = AppConfig::load(cli.config)?;
    if let Some(path) = cli.db {
        config.database.path = Some(path);
    }

    init_tracing(&config);

    let db_path = config.database_path()?;
    info!(path = ?db_path, "Opening database");

    let db = Database::new(
        DbConfig::new(db_path).max_connections(config.database.max_connections),
    )
    .await?;

    let ctx = Context {
        db,
        config,
        json: cli.json,
    };

    let result = commands::run(&ctx, cli.command).await;
    ctx.db.close().await;
    debug!("Database closed");

    result
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
