//! # Repository Module
//!
//! Database repository implementations for Stota POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.products().add(&draft)                                     │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── add / edit / delete                                               │
//! │  └── get / find / list                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Each module also exposes `*_in(&mut SqliteConnection, …)` helpers so  │
//! │  the Ledger can run several repositories' writes in one transaction.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and lookup
//! - [`OrderRepository`](order::OrderRepository) - Order reads
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Expense ledger

pub mod expense;
pub mod order;
pub mod product;
