//! # Validation Module
//!
//! Input validation for catalog, order and expense operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Type validation (integers, decimal amounts)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Empty ids / names / comments                                      │
//! │  └── Negative prices, non-positive quantities                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY constraints                                           │
//! │  └── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a product id (must not be blank).
///
/// ## Example
/// ```rust
/// use stota_core::validation::validate_product_id;
///
/// assert!(validate_product_id("P1").is_ok());
/// assert!(validate_product_id("  ").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    require("product id", id)
}

/// Validates a product name (must not be blank).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require("name", name)
}

/// Validates an expense comment (must not be blank).
pub fn validate_comment(comment: &str) -> ValidationResult<()> {
    require("comment", comment)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that a monetary field (cost, price) is not negative.
/// Zero is allowed (free items).
pub fn validate_non_negative_money(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Validates an order line quantity.
///
/// ## User Workflow
/// ```text
/// Operator enters quantity: 0
///       │
///       ▼
/// validate_quantity(0) ← THIS FUNCTION
///       │
///       └── qty <= 0? → Error: "quantity must be positive"
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates an expense amount (strictly positive).
pub fn validate_expense_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
