//! # Legacy Line-Item Codec
//!
//! Older stores kept an order's products in one text column:
//!
//! ```text
//! Green Tea: 3 | Cake: 1
//! ```
//!
//! Order exports keep writing this shape so existing spreadsheets still
//! line up, and `parse` reads it back for imports.

use crate::error::{CoreResult, ValidationError};
use crate::types::LineItem;
use crate::validation::validate_quantity;

/// Separator between pairs.
pub const PAIR_SEPARATOR: &str = " | ";

/// Separator between name and quantity inside a pair.
pub const QTY_SEPARATOR: &str = ": ";

/// One decoded `"name: qty"` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyLine {
    pub name: String,
    pub quantity: i64,
}

/// Formats line items as `"name: qty | name: qty"` using their name snapshots.
///
/// ## Example
/// ```rust
/// use stota_core::line_items::format;
/// use stota_core::LineItem;
///
/// let items = vec![LineItem {
///     product_id: "P1".into(),
///     name_snapshot: "Tea".into(),
///     unit_price_cents: 100,
///     quantity: 2,
/// }];
/// assert_eq!(format(&items), "Tea: 2");
/// ```
pub fn format(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}{}{}", item.name_snapshot, QTY_SEPARATOR, item.quantity))
        .collect::<Vec<_>>()
        .join(PAIR_SEPARATOR)
}

/// Parses `"name: qty | name: qty"`.
///
/// The quantity is taken after the last `": "` so names may contain colons.
/// An empty or blank string parses to no lines.
pub fn parse(encoded: &str) -> CoreResult<Vec<LegacyLine>> {
    if encoded.trim().is_empty() {
        return Ok(Vec::new());
    }

    encoded
        .split(PAIR_SEPARATOR)
        .map(|pair| {
            let (name, qty) = pair.rsplit_once(QTY_SEPARATOR).ok_or_else(|| {
                ValidationError::InvalidFormat {
                    field: "line item".to_string(),
                    reason: format!("expected 'name: qty', got '{pair}'"),
                }
            })?;

            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::Required {
                    field: "line item name".to_string(),
                }
                .into());
            }

            let quantity: i64 =
                qty.trim()
                    .parse()
                    .map_err(|_| ValidationError::InvalidFormat {
                        field: "line item quantity".to_string(),
                        reason: format!("'{}' is not a whole number", qty.trim()),
                    })?;
            validate_quantity(quantity)?;

            Ok(LegacyLine {
                name: name.to_string(),
                quantity,
            })
        })
        .collect()
}
