//! # Inventory Planning
//!
//! The order state machine as pure functions. Each operation is planned
//! against an in-memory snapshot of the products it touches; the plan says
//! what the order becomes and how every product's stock moves. Nothing is
//! written here. `stota-db`'s `Ledger` loads the snapshot and applies the
//! plan inside one database transaction, or applies nothing.
//!
//! ## Snapshot → Validate → Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Ledger (db tx)          plan_* (this module)         Ledger (db tx)   │
//! │   ──────────────          ────────────────────         ──────────────   │
//! │   load touched    ──────► working = snapshot   ──ok──► write deltas     │
//! │   products                reverse old lines            write order      │
//! │                           apply new lines              COMMIT           │
//! │                                 │                                       │
//! │                                 └──────err───────────► ROLLBACK         │
//! │                                                        (nothing moved)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because every check runs against `working` before anything is written,
//! a failure on the third line of an order never leaves the first two
//! decremented, and a failed edit never leaves the old lines reversed.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::apply_stock_delta;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{LineItem, LineRequest, Order, Product, RefundRequest};
use crate::validation::{validate_product_id, validate_quantity};

// =============================================================================
// Snapshot
// =============================================================================

/// The catalog rows an operation reads, keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: HashMap<String, Product>,
}

impl CatalogSnapshot {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        CatalogSnapshot {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }
}

/// Running stock levels while a plan is built.
struct WorkingStock<'a> {
    snapshot: &'a CatalogSnapshot,
    levels: HashMap<String, i64>,
}

impl<'a> WorkingStock<'a> {
    fn new(snapshot: &'a CatalogSnapshot) -> Self {
        WorkingStock {
            snapshot,
            levels: snapshot
                .products
                .iter()
                .map(|(id, p)| (id.clone(), p.stock))
                .collect(),
        }
    }

    /// Returns `qty` units of a product to stock. Products no longer in the
    /// catalog cannot receive stock; `Ok(false)` tells the caller to skip them.
    fn give_back(&mut self, product_id: &str, qty: i64) -> CoreResult<bool> {
        match self.levels.get_mut(product_id) {
            Some(level) => {
                *level = level
                    .checked_add(qty)
                    .ok_or_else(|| ValidationError::too_large("stock"))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Takes `qty` units of a product out of stock.
    fn take(&mut self, product: &Product, qty: i64) -> CoreResult<()> {
        let level = self
            .levels
            .get_mut(&product.id)
            .ok_or_else(|| CoreError::ProductNotFound(product.id.clone()))?;
        *level = apply_stock_delta(&product.name, *level, -qty)?;
        Ok(())
    }

    /// Net change per product relative to the snapshot, zeros dropped.
    fn deltas(&self) -> BTreeMap<String, i64> {
        self.levels
            .iter()
            .filter_map(|(id, level)| {
                let original = self.snapshot.products.get(id)?.stock;
                let delta = level - original;
                (delta != 0).then(|| (id.clone(), delta))
            })
            .collect()
    }
}

// =============================================================================
// Plans
// =============================================================================

/// Result of planning a Create or Edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    /// The order's new line items, in caller order.
    pub items: Vec<LineItem>,
    /// Σ unit_price × quantity of `items`.
    pub total: Money,
    /// Net stock change per product id.
    pub stock_deltas: BTreeMap<String, i64>,
    /// Product ids whose reversal was skipped because they left the catalog.
    pub skipped_reversals: Vec<String>,
}

/// Result of planning a Delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalPlan {
    pub stock_deltas: BTreeMap<String, i64>,
    pub skipped_reversals: Vec<String>,
}

/// Result of planning a Refund.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundPlan {
    /// Lines that still hold units, with reduced quantities.
    pub remaining: Vec<LineItem>,
    /// Σ unit_price × refunded quantity.
    pub refunded: Money,
    /// Order total after the refund.
    pub new_total: Money,
    pub stock_deltas: BTreeMap<String, i64>,
    pub skipped_reversals: Vec<String>,
}

impl RefundPlan {
    /// No line remains: the order is deleted instead of updated.
    pub fn removes_order(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Product ids an operation must load before planning.
pub fn touched_products<'a>(
    existing: Option<&'a Order>,
    lines: &'a [LineRequest],
) -> Vec<&'a str> {
    let mut ids: Vec<&str> = existing
        .into_iter()
        .flat_map(|order| order.items.iter().map(|item| item.product_id.as_str()))
        .chain(lines.iter().map(|line| line.product_id.as_str()))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

// =============================================================================
// Operations
// =============================================================================

/// Validates requested lines and merges repeated product ids.
///
/// Quantities of a repeated product are summed at its first position, so a
/// product appears on at most one line of an order.
pub fn normalize_lines(lines: &[LineRequest]) -> CoreResult<Vec<LineRequest>> {
    if lines.is_empty() {
        return Err(CoreError::EmptyOrder);
    }

    let mut merged: Vec<LineRequest> = Vec::with_capacity(lines.len());
    for line in lines {
        validate_product_id(&line.product_id)?;
        validate_quantity(line.quantity)?;

        let product_id = line.product_id.trim();
        match merged.iter_mut().find(|m| m.product_id == product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| ValidationError::too_large("quantity"))?;
            }
            None => merged.push(LineRequest::new(product_id, line.quantity)),
        }
    }
    Ok(merged)
}

fn apply_lines(
    snapshot: &CatalogSnapshot,
    working: &mut WorkingStock<'_>,
    lines: &[LineRequest],
) -> CoreResult<(Vec<LineItem>, Money)> {
    let mut items = Vec::with_capacity(lines.len());
    let mut total = Money::zero();

    for line in lines {
        let product = snapshot
            .get(&line.product_id)
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        working.take(product, line.quantity)?;

        let item = LineItem {
            product_id: product.id.clone(),
            name_snapshot: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: line.quantity,
        };
        total = item
            .unit_price()
            .multiply_quantity(item.quantity)
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or_else(|| ValidationError::too_large("order total"))?;
        items.push(item);
    }

    Ok((items, total))
}

fn reverse_items(working: &mut WorkingStock<'_>, items: &[LineItem]) -> CoreResult<Vec<String>> {
    let mut skipped = Vec::new();
    for item in items {
        if !working.give_back(&item.product_id, item.quantity)? {
            skipped.push(item.product_id.clone());
        }
    }
    Ok(skipped)
}

/// Plans **Create**: take every line out of stock at current prices.
///
/// ## Errors
/// - `EmptyOrder` - no lines
/// - `Validation` - blank product id or quantity <= 0
/// - `ProductNotFound` - a line names an unknown product
/// - `InsufficientStock` - first line (in caller order) that cannot be filled
pub fn plan_create(snapshot: &CatalogSnapshot, lines: &[LineRequest]) -> CoreResult<OrderPlan> {
    let lines = normalize_lines(lines)?;
    let mut working = WorkingStock::new(snapshot);
    let (items, total) = apply_lines(snapshot, &mut working, &lines)?;

    Ok(OrderPlan {
        items,
        total,
        stock_deltas: working.deltas(),
        skipped_reversals: Vec::new(),
    })
}

/// Plans **Edit**: return the existing lines to stock, then apply the new
/// lines against that hypothetical stock.
///
/// The reversal and the new decrements come back as one net delta per
/// product, so they are written together or not at all.
pub fn plan_edit(
    snapshot: &CatalogSnapshot,
    existing: &Order,
    lines: &[LineRequest],
) -> CoreResult<OrderPlan> {
    let lines = normalize_lines(lines)?;
    let mut working = WorkingStock::new(snapshot);
    let skipped_reversals = reverse_items(&mut working, &existing.items)?;
    let (items, total) = apply_lines(snapshot, &mut working, &lines)?;

    Ok(OrderPlan {
        items,
        total,
        stock_deltas: working.deltas(),
        skipped_reversals,
    })
}

/// Plans **Delete**: return every line to stock.
pub fn plan_delete(snapshot: &CatalogSnapshot, existing: &Order) -> CoreResult<ReversalPlan> {
    let mut working = WorkingStock::new(snapshot);
    let skipped_reversals = reverse_items(&mut working, &existing.items)?;

    Ok(ReversalPlan {
        stock_deltas: working.deltas(),
        skipped_reversals,
    })
}

fn validate_refund(existing: &Order, refund: &RefundRequest) -> CoreResult<()> {
    for (product_id, &requested) in refund {
        if requested < 0 {
            return Err(ValidationError::Negative {
                field: format!("refund quantity for {product_id}"),
            }
            .into());
        }

        let ordered = existing.quantity_of(product_id);
        let on_order = existing.items.iter().any(|i| &i.product_id == product_id);
        if !on_order {
            return Err(ValidationError::NotOnOrder {
                product: product_id.clone(),
                order_id: existing.id.clone(),
            }
            .into());
        }
        if requested > ordered {
            return Err(ValidationError::RefundExceedsQuantity {
                product: product_id.clone(),
                requested,
                ordered,
            }
            .into());
        }
    }

    if refund.values().all(|&qty| qty == 0) {
        return Err(CoreError::EmptyRefund);
    }
    Ok(())
}

/// Plans **Refund**: return the requested units of each line to stock and
/// reduce the order by what those units charged.
///
/// ## Per Line
/// ```text
/// refund_qty = refund[product_id] (0 when absent)
/// stock     += refund_qty
/// refunded  += unit_price × refund_qty
/// remaining  = quantity − refund_qty   (line kept only if > 0)
/// ```
///
/// ## Errors
/// - `Validation` - negative quantity, more than ordered, product not on order
/// - `EmptyRefund` - every requested quantity is zero
pub fn plan_refund(
    snapshot: &CatalogSnapshot,
    existing: &Order,
    refund: &RefundRequest,
) -> CoreResult<RefundPlan> {
    validate_refund(existing, refund)?;

    let mut working = WorkingStock::new(snapshot);
    let mut skipped_reversals = Vec::new();
    let mut remaining = Vec::with_capacity(existing.items.len());
    let mut refunded = Money::zero();

    // Quantities are consumed as lines are visited so an id that somehow
    // appears on two lines is not refunded twice.
    let mut outstanding: BTreeMap<&str, i64> = refund
        .iter()
        .map(|(id, qty)| (id.as_str(), *qty))
        .collect();

    for item in &existing.items {
        let wanted = outstanding.get(item.product_id.as_str()).copied().unwrap_or(0);
        let refund_qty = wanted.min(item.quantity);
        if let Some(left) = outstanding.get_mut(item.product_id.as_str()) {
            *left -= refund_qty;
        }

        if refund_qty > 0 && !working.give_back(&item.product_id, refund_qty)? {
            skipped_reversals.push(item.product_id.clone());
        }
        refunded = item
            .unit_price()
            .multiply_quantity(refund_qty)
            .and_then(|amount| refunded.checked_add(amount))
            .ok_or_else(|| ValidationError::too_large("refund"))?;

        let left_on_line = item.quantity - refund_qty;
        if left_on_line > 0 {
            remaining.push(LineItem {
                quantity: left_on_line,
                ..item.clone()
            });
        }
    }

    Ok(RefundPlan {
        new_total: existing.total() - refunded,
        remaining,
        refunded,
        stock_deltas: working.deltas(),
        skipped_reversals,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("{id}-name"),
            cost_cents: price / 2,
            price_cents: price,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    fn order_from(plan: &OrderPlan) -> Order {
        let now = Utc::now();
        Order {
            id: "ORD1".into(),
            created_at: now,
            updated_at: now,
            total_cents: plan.total.cents(),
            items: plan.items.clone(),
        }
    }

    #[test]
    fn test_create_decrements_and_totals() {
        let snap = CatalogSnapshot::new([product("P1", 1000, 5)]);
        let plan = plan_create(&snap, &[LineRequest::new("P1", 3)]).unwrap();

        assert_eq!(plan.total.cents(), 3000);
        assert_eq!(plan.stock_deltas.get("P1"), Some(&-3));
        assert_eq!(plan.items[0].name_snapshot, "P1-name");
    }

    #[test]
    fn test_create_empty_order() {
        let snap = CatalogSnapshot::new([product("P1", 1000, 5)]);
        assert_eq!(plan_create(&snap, &[]), Err(CoreError::EmptyOrder));
    }

    #[test]
    fn test_create_insufficient_names_first_failing_line() {
        let snap = CatalogSnapshot::new([product("P1", 1000, 5), product("P2", 500, 1)]);
        let err = plan_create(
            &snap,
            &[LineRequest::new("P1", 2), LineRequest::new("P2", 4)],
        )
        .unwrap_err();

        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product: "P2-name".into(),
                requested: 4,
                available: 1,
            }
        );
    }

    #[test]
    fn test_create_merges_repeated_products() {
        let snap = CatalogSnapshot::new([product("P1", 100, 5)]);
        let plan = plan_create(
            &snap,
            &[LineRequest::new("P1", 2), LineRequest::new("P1", 3)],
        )
        .unwrap();
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].quantity, 5);

        let too_many = plan_create(
            &snap,
            &[LineRequest::new("P1", 3), LineRequest::new("P1", 3)],
        );
        assert!(matches!(too_many, Err(CoreError::InsufficientStock { .. })));
    }

    #[test]
    fn test_create_unknown_product_and_bad_quantity() {
        let snap = CatalogSnapshot::new([product("P1", 100, 5)]);
        assert_eq!(
            plan_create(&snap, &[LineRequest::new("P9", 1)]),
            Err(CoreError::ProductNotFound("P9".into()))
        );
        assert!(matches!(
            plan_create(&snap, &[LineRequest::new("P1", 0)]),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_create_rejects_values_out_of_range() {
        let too_large = |field: &str| -> CoreResult<OrderPlan> {
            Err(ValidationError::too_large(field).into())
        };

        let snap = CatalogSnapshot::new([product("P1", 100, 5)]);
        assert_eq!(
            plan_create(
                &snap,
                &[LineRequest::new("P1", i64::MAX), LineRequest::new("P1", 1)],
            ),
            too_large("quantity")
        );

        let pricey = CatalogSnapshot::new([product("P1", i64::MAX, 5)]);
        assert_eq!(
            plan_create(&pricey, &[LineRequest::new("P1", 2)]),
            too_large("order total")
        );

        let two_pricey = CatalogSnapshot::new([product("P1", i64::MAX, 5), product("P2", 1, 5)]);
        assert_eq!(
            plan_create(
                &two_pricey,
                &[LineRequest::new("P1", 1), LineRequest::new("P2", 1)],
            ),
            too_large("order total")
        );
    }

    #[test]
    fn test_reversal_beyond_max_stock_is_rejected() {
        let snap = CatalogSnapshot::new([product("P1", 100, 5)]);
        let order = order_from(&plan_create(&snap, &[LineRequest::new("P1", 2)]).unwrap());

        // Restocked to the limit since the order was taken
        let full = CatalogSnapshot::new([product("P1", 100, i64::MAX)]);
        assert_eq!(
            plan_delete(&full, &order),
            Err(CoreError::Validation(ValidationError::too_large("stock")))
        );
        assert!(plan_refund(&full, &order, &RefundRequest::from([("P1".into(), 1)])).is_err());
    }

    #[test]
    fn test_edit_uses_reversed_stock() {
        // Stock after the original order of 3 is 2; editing to 4 is feasible
        // only because the 3 come back first.
        let snap = CatalogSnapshot::new([product("P1", 1000, 2)]);
        let original = order_from(&OrderPlan {
            items: vec![LineItem {
                product_id: "P1".into(),
                name_snapshot: "P1-name".into(),
                unit_price_cents: 1000,
                quantity: 3,
            }],
            total: Money::from_cents(3000),
            stock_deltas: BTreeMap::new(),
            skipped_reversals: vec![],
        });

        let plan = plan_edit(&snap, &original, &[LineRequest::new("P1", 4)]).unwrap();
        assert_eq!(plan.stock_deltas.get("P1"), Some(&-1));
        assert_eq!(plan.total.cents(), 4000);

        let shrink = plan_edit(&snap, &original, &[LineRequest::new("P1", 2)]).unwrap();
        assert_eq!(shrink.stock_deltas.get("P1"), Some(&1));

        let infeasible = plan_edit(&snap, &original, &[LineRequest::new("P1", 6)]);
        assert!(matches!(infeasible, Err(CoreError::InsufficientStock { available: 5, .. })));
    }

    #[test]
    fn test_delete_reverses_and_skips_missing() {
        let snap = CatalogSnapshot::new([product("P1", 1000, 2)]);
        let order = Order {
            id: "ORD1".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            total_cents: 3500,
            items: vec![
                LineItem {
                    product_id: "P1".into(),
                    name_snapshot: "Tea".into(),
                    unit_price_cents: 1000,
                    quantity: 3,
                },
                LineItem {
                    product_id: "GONE".into(),
                    name_snapshot: "Old".into(),
                    unit_price_cents: 500,
                    quantity: 1,
                },
            ],
        };

        let plan = plan_delete(&snap, &order).unwrap();
        assert_eq!(plan.stock_deltas.get("P1"), Some(&3));
        assert_eq!(plan.skipped_reversals, vec!["GONE".to_string()]);
    }

    #[test]
    fn test_refund_partial_and_full() {
        let snap = CatalogSnapshot::new([product("P1", 1000, 0), product("P2", 500, 0)]);
        let created = plan_create(
            &CatalogSnapshot::new([product("P1", 1000, 3), product("P2", 500, 2)]),
            &[LineRequest::new("P1", 3), LineRequest::new("P2", 2)],
        )
        .unwrap();
        let order = order_from(&created);

        let partial = plan_refund(&snap, &order, &RefundRequest::from([("P1".into(), 1)])).unwrap();
        assert_eq!(partial.refunded.cents(), 1000);
        assert_eq!(partial.new_total.cents(), 3000);
        assert_eq!(partial.remaining[0].quantity, 2);
        assert_eq!(partial.remaining[1].quantity, 2);
        assert_eq!(partial.stock_deltas.get("P1"), Some(&1));
        assert_eq!(partial.stock_deltas.get("P2"), None);
        assert!(!partial.removes_order());

        let full = plan_refund(
            &snap,
            &order,
            &RefundRequest::from([("P1".into(), 3), ("P2".into(), 2)]),
        )
        .unwrap();
        assert!(full.removes_order());
        assert_eq!(full.refunded.cents(), 4000);
        assert_eq!(full.new_total, Money::zero());
    }

    #[test]
    fn test_refund_rejections() {
        let snap = CatalogSnapshot::new([product("P1", 1000, 0)]);
        let order = order_from(
            &plan_create(
                &CatalogSnapshot::new([product("P1", 1000, 3)]),
                &[LineRequest::new("P1", 3)],
            )
            .unwrap(),
        );

        assert_eq!(
            plan_refund(&snap, &order, &RefundRequest::from([("P1".into(), 0)])),
            Err(CoreError::EmptyRefund)
        );
        assert_eq!(
            plan_refund(&snap, &order, &RefundRequest::new()),
            Err(CoreError::EmptyRefund)
        );
        assert!(matches!(
            plan_refund(&snap, &order, &RefundRequest::from([("P1".into(), 4)])),
            Err(CoreError::Validation(ValidationError::RefundExceedsQuantity { .. }))
        ));
        assert!(matches!(
            plan_refund(&snap, &order, &RefundRequest::from([("P7".into(), 1)])),
            Err(CoreError::Validation(ValidationError::NotOnOrder { .. }))
        ));
        assert!(matches!(
            plan_refund(&snap, &order, &RefundRequest::from([("P1".into(), -1)])),
            Err(CoreError::Validation(ValidationError::Negative { .. }))
        ));
    }

    #[test]
    fn test_touched_products_dedups() {
        let lines = [LineRequest::new("B", 1), LineRequest::new("A", 1), LineRequest::new("B", 2)];
        assert_eq!(touched_products(None, &lines), vec!["A", "B"]);
    }
}
