//! # stota-db: Database Layer for Stota POS
//!
//! This crate provides database access for Stota POS: SQLite through sqlx,
//! the repositories, and the `Ledger` that runs every stock-moving
//! operation inside one transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stota POS Data Flow                              │
//! │                                                                         │
//! │  stota order create P1=2 P2=1                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     stota-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Ledger     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (ledger.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ plan_* from   │    │ 001_init.sql │  │   │
//! │  │   │ writer lock   │    │ stota-core    │    │              │  │   │
//! │  │   └───────▲───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────┴───────────────────────────────┐                     │   │
//! │  │   │ Repositories: product, order, expense │  ReportService      │   │
//! │  │   └───────────────────────────────────────┘                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/pos/stota.db (platform data dir)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product, order and expense repositories
//! - [`ledger`] - Create/Edit/Delete/Refund as single transactions
//! - [`reports`] - Report loading
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stota_db::{Database, DbConfig};
//! use stota_core::LineRequest;
//!
//! let db = Database::new(DbConfig::new("path/to/stota.db")).await?;
//!
//! let order = db.ledger().create_order(&[LineRequest::new("P1", 2)]).await?;
//! let summary = db.reports().summary().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::Ledger;
pub use pool::{Database, DbConfig};
pub use reports::{ReportService, UnitsReport};

// Repository re-exports for convenience
pub use repository::expense::ExpenseRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
