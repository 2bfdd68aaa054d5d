//! # Catalog Rules
//!
//! Pure rules for the product table: field validation for add/edit, the
//! stock adjustment invariant, and name lookup over a loaded product list.
//! Persistence lives in `stota-db`'s `ProductRepository`.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, ProductDraft};
use crate::validation::{
    validate_non_negative_money, validate_product_id, validate_product_name, validate_stock,
};

impl ProductDraft {
    /// Builds a draft with trimmed id and name.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: crate::Money,
        price: crate::Money,
        stock: i64,
    ) -> Self {
        ProductDraft {
            id: id.into().trim().to_string(),
            name: name.into().trim().to_string(),
            cost,
            price,
            stock,
        }
    }

    /// Checks every field rule of `add` and `edit`.
    ///
    /// ## Rules
    /// - id and name non-empty
    /// - cost, price, stock non-negative
    pub fn validate(&self) -> CoreResult<()> {
        validate_product_id(&self.id)?;
        validate_product_name(&self.name)?;
        validate_non_negative_money("cost", self.cost)?;
        validate_non_negative_money("price", self.price)?;
        validate_stock(self.stock)?;
        Ok(())
    }
}

/// Applies `delta` to a stock level.
///
/// Fails with `InsufficientStock` instead of going below zero. `requested`
/// in the error is the number of units the delta tried to take. A result
/// beyond `i64::MAX` is a `Validation` error.
///
/// ## Example
/// ```rust
/// use stota_core::catalog::apply_stock_delta;
///
/// assert_eq!(apply_stock_delta("Tea", 5, -3).unwrap(), 2);
/// assert!(apply_stock_delta("Tea", 2, -3).is_err());
/// ```
pub fn apply_stock_delta(product: &str, stock: i64, delta: i64) -> CoreResult<i64> {
    let next = stock
        .checked_add(delta)
        .ok_or_else(|| ValidationError::too_large("stock"))?;
    if next < 0 {
        return Err(CoreError::InsufficientStock {
            product: product.to_string(),
            requested: delta.saturating_neg(),
            available: stock,
        });
    }
    Ok(next)
}

/// Finds the first product with exactly this name.
pub fn find_by_name<'a>(products: &'a [Product], name: &str) -> CoreResult<&'a Product> {
    products
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| CoreError::ProductNotFound(name.to_string()))
}
