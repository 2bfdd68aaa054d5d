//! # stota-core: Pure Business Logic for Stota POS
//!
//! This crate holds the rules of the store as pure functions with zero I/O
//! dependencies: catalog validation, the inventory planner behind every
//! order transaction, and report aggregation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stota POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    stota (CLI)                                  │   │
//! │  │    product ──► order ──► expense ──► report ──► export         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stota-db (Database Layer)                    │   │
//! │  │     repositories, Ledger (single writer), migrations            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshot in, plan out                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stota-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  catalog  │  │ inventory │  │  report   │  │   │
//! │  │   │  Product  │  │   rules   │  │  planner  │  │  profit   │  │   │
//! │  │   │   Order   │  │  stock Δ  │  │  refunds  │  │  sales    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, LineItem, Expense)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level rules
//! - [`catalog`] - Product draft checks and the stock invariant
//! - [`inventory`] - Create/Edit/Delete/Refund planning over a stock snapshot
//! - [`line_items`] - The `"name: qty | name: qty"` text layout
//! - [`report`] - Profit summary and sales breakdowns
//!
//! ## Example Usage
//!
//! ```rust
//! use stota_core::inventory::{plan_create, CatalogSnapshot};
//! use stota_core::{LineRequest, Money, Product};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let tea = Product {
//!     id: "P1".into(),
//!     name: "Tea".into(),
//!     cost_cents: 400,
//!     price_cents: 1000,
//!     stock: 5,
//!     created_at: now,
//!     updated_at: now,
//! };
//!
//! let snapshot = CatalogSnapshot::new(vec![tea]);
//! let plan = plan_create(&snapshot, &[LineRequest::new("P1", 2)]).unwrap();
//!
//! assert_eq!(plan.total, Money::from_cents(2000));
//! assert_eq!(plan.stock_deltas.get("P1"), Some(&-2));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod inventory;
pub mod line_items;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
