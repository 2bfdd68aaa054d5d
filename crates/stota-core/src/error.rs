//! # Error Types
//!
//! Domain-specific error types for stota-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stota-core errors (this file)                                         │
//! │  ├── CoreError        - Catalog / inventory / ledger rule violations   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stota-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  stota-cli errors (app)                                                │
//! │  └── AppError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → stderr       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is recoverable: the operation that produced it leaves the
/// catalog and ledger unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A product id is already taken in the catalog.
    #[error("Product id '{id}' already exists")]
    DuplicateId { id: String },

    /// Product cannot be found (by id or by name).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Expense cannot be found.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(i64),

    /// Requested quantity exceeds what is left in stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Create order {P1: 10}
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { product: "P1", requested: 10, available: 2 }
    ///      │
    ///      ▼
    /// Nothing written, caller shows "Only 2 P1 in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    /// An order must contain at least one line item.
    #[error("Order has no line items")]
    EmptyOrder,

    /// A refund must return at least one unit.
    #[error("Refund returns no items")]
    EmptyRefund,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (unparseable amount, malformed line item, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Refund asks for more units than the order line holds.
    #[error("Cannot refund {requested} of {product}: order holds {ordered}")]
    RefundExceedsQuantity {
        product: String,
        requested: i64,
        ordered: i64,
    },

    /// Refund names a product that is not on the order.
    #[error("Product {product} is not on order {order_id}")]
    NotOnOrder { product: String, order_id: String },
}

impl ValidationError {
    /// A value whose arithmetic left the i64 range.
    pub fn too_large(field: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: "too large".to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
