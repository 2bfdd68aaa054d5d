//! # Domain Types
//!
//! Core domain types used throughout Stota POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Expense      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (business)  │   │  id (ORD…)      │   │  id (autoinc)   │       │
//! │  │  name           │   │  created_at     │   │  created_at     │       │
//! │  │  cost_cents     │   │  total_cents    │   │  amount_cents   │       │
//! │  │  price_cents    │   │  items ──┐      │   │  comment        │       │
//! │  │  stock          │   └──────────┼──────┘   └─────────────────┘       │
//! │  └────────▲────────┘              ▼                                     │
//! │           │           ┌─────────────────┐                               │
//! │           └───────────│    LineItem     │                               │
//! │          product_id   │  name_snapshot  │                               │
//! │                       │  unit_price     │                               │
//! │                       │  quantity       │                               │
//! │                       └─────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Line items join to the catalog by `product_id` and freeze the product's
//! name and price at the moment the line is written. Renaming or repricing a
//! product never changes what an existing order charged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Business identifier chosen by the operator. Immutable.
    pub id: String,

    /// Display name. Not required to be unique.
    pub name: String,

    /// Acquisition cost per unit, in cents.
    pub cost_cents: i64,

    /// Sale price per unit, in cents.
    pub price_cents: i64,

    /// Units currently available. Never negative.
    pub stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the unit cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Checks whether `quantity` units can be taken from stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Field values for adding or editing a product.
///
/// `edit` replaces every field except `id`, so the same shape serves both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub id: String,
    pub name: String,
    pub cost: Money,
    pub price: Money,
    pub stock: i64,
}

// =============================================================================
// Order
// =============================================================================

/// One (product, quantity) pair within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LineItem {
    /// Catalog join key.
    pub product_id: String,
    /// Product name when the line was written (display only).
    pub name_snapshot: String,
    /// Unit price in cents when the line was written.
    pub unit_price_cents: i64,
    /// Units on this line. Always positive.
    pub quantity: i64,
}

impl LineItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// unit_price × quantity, saturating. Stored lines always fit.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price() * self.quantity
    }
}

/// A sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Timestamp-derived id, e.g. `ORD20260131142501123`.
    pub id: String,

    /// Set once at creation; edits and refunds keep it.
    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Always Σ line totals of `items`.
    pub total_cents: i64,

    /// Line items in caller order.
    pub items: Vec<LineItem>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Recomputes Σ unit_price × quantity from the line items.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Total units on the order for one product.
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .filter(|item| item.product_id == product_id)
            .map(|item| item.quantity)
            .sum()
    }
}

/// A requested order line: which product and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl LineRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        LineRequest {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Refund quantities keyed by product id.
pub type RefundRequest = BTreeMap<String, i64>;

/// What a successful refund did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub order_id: String,
    /// Σ unit_price × refunded quantity.
    pub refunded: Money,
    /// True when no line remained and the order was deleted.
    pub order_removed: bool,
    /// The order after the refund, if it still exists.
    pub order: Option<Order>,
}

// =============================================================================
// Expense
// =============================================================================

/// A miscellaneous store expense. Does not touch stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub amount_cents: i64,
    pub comment: String,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}
