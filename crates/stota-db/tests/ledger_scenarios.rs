//! End-to-end order flows against an in-memory database.

use std::collections::BTreeMap;

use stota_core::{
    CoreError, LineRequest, Money, Order, ProductDraft, RefundRequest, ValidationError,
};
use stota_db::{Database, DbConfig, DbError};

// =============================================================================
// Helpers
// =============================================================================

async fn store_with(products: &[(&str, i64, i64)]) -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    for (id, price, stock) in products {
        let draft = ProductDraft::new(
            *id,
            format!("{id} item"),
            Money::from_cents(price / 2),
            Money::from_cents(*price),
            *stock,
        );
        db.products().add(&draft).await.unwrap();
    }
    db
}

async fn stock(db: &Database, id: &str) -> i64 {
    db.products().get(id).await.unwrap().unwrap().stock
}

fn refund(pairs: &[(&str, i64)]) -> RefundRequest {
    pairs.iter().map(|(id, qty)| (id.to_string(), *qty)).collect()
}

fn lines(pairs: &[(&str, i64)]) -> Vec<LineRequest> {
    pairs.iter().map(|(id, qty)| LineRequest::new(*id, *qty)).collect()
}

fn quantities(order: &Order) -> BTreeMap<String, i64> {
    order
        .items
        .iter()
        .map(|i| (i.product_id.clone(), i.quantity))
        .collect()
}

/// stock + Σ quantities on open orders, per product.
async fn accounted_units(db: &Database, id: &str) -> i64 {
    let on_orders: i64 = db
        .orders()
        .list()
        .await
        .unwrap()
        .iter()
        .map(|o| o.quantity_of(id))
        .sum();
    stock(db, id).await + on_orders
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[tokio::test]
async fn create_takes_stock_and_totals_at_current_price() {
    let db = store_with(&[("P1", 1000, 5)]).await;

    let order = db.ledger().create_order(&lines(&[("P1", 3)])).await.unwrap();

    assert_eq!(stock(&db, "P1").await, 2);
    assert_eq!(order.total(), Money::from_cents(3000));
    assert_eq!(order.total(), order.items_total());
}

#[tokio::test]
async fn create_beyond_stock_fails_and_leaves_stock() {
    let db = store_with(&[("P1", 1000, 5)]).await;
    db.ledger().create_order(&lines(&[("P1", 3)])).await.unwrap();

    let err = db
        .ledger()
        .create_order(&lines(&[("P1", 10)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_domain(),
        Some(CoreError::InsufficientStock {
            requested: 10,
            available: 2,
            ..
        })
    ));
    assert_eq!(stock(&db, "P1").await, 2);
    assert_eq!(db.orders().count().await.unwrap(), 1);
}

#[tokio::test]
async fn full_refund_removes_order_and_restores_stock() {
    let db = store_with(&[("P1", 1000, 5)]).await;
    let order = db.ledger().create_order(&lines(&[("P1", 3)])).await.unwrap();

    let outcome = db
        .ledger()
        .refund_order(&order.id, &refund(&[("P1", 3)]))
        .await
        .unwrap();

    assert!(outcome.order_removed);
    assert!(outcome.order.is_none());
    assert_eq!(outcome.refunded, Money::from_cents(3000));
    assert_eq!(stock(&db, "P1").await, 5);
    assert!(db.orders().get(&order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn partial_refund_reduces_one_line() {
    let db = store_with(&[("P1", 1000, 5), ("P2", 700, 5)]).await;
    let order = db
        .ledger()
        .create_order(&lines(&[("P1", 3), ("P2", 2)]))
        .await
        .unwrap();
    let p2_before = stock(&db, "P2").await;

    let outcome = db
        .ledger()
        .refund_order(&order.id, &refund(&[("P1", 1)]))
        .await
        .unwrap();

    assert!(!outcome.order_removed);
    assert_eq!(outcome.refunded, Money::from_cents(1000));

    let stored = db.orders().get(&order.id).await.unwrap().unwrap();
    assert_eq!(
        quantities(&stored),
        BTreeMap::from([("P1".to_string(), 2), ("P2".to_string(), 2)])
    );
    assert_eq!(stored.total(), order.total() - Money::from_cents(1000));
    assert_eq!(stored.created_at, order.created_at);
    assert_eq!(stock(&db, "P1").await, 3);
    assert_eq!(stock(&db, "P2").await, p2_before);
}

#[tokio::test]
async fn edit_down_returns_the_difference() {
    let db = store_with(&[("P1", 1000, 5)]).await;
    let order = db.ledger().create_order(&lines(&[("P1", 3)])).await.unwrap();
    let before = stock(&db, "P1").await;

    let edited = db
        .ledger()
        .edit_order(&order.id, &lines(&[("P1", 2)]))
        .await
        .unwrap();

    assert_eq!(stock(&db, "P1").await - before, 1);
    assert_eq!(edited.total(), Money::from_cents(2000));
    assert_eq!(edited.id, order.id);
    assert_eq!(edited.created_at, order.created_at);
}

// =============================================================================
// Atomicity
// =============================================================================

#[tokio::test]
async fn infeasible_edit_changes_nothing() {
    let db = store_with(&[("P1", 1000, 5), ("P2", 500, 1)]).await;
    let order = db.ledger().create_order(&lines(&[("P1", 3)])).await.unwrap();

    // P1 would be fine after reversal; P2 cannot cover 4.
    let err = db
        .ledger()
        .edit_order(&order.id, &lines(&[("P1", 4), ("P2", 4)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(CoreError::InsufficientStock { .. })
    ));

    assert_eq!(stock(&db, "P1").await, 2);
    assert_eq!(stock(&db, "P2").await, 1);
    assert_eq!(db.orders().get(&order.id).await.unwrap().unwrap(), order);
}

#[tokio::test]
async fn edit_may_use_stock_freed_by_its_own_reversal() {
    let db = store_with(&[("P1", 1000, 3)]).await;
    let order = db.ledger().create_order(&lines(&[("P1", 3)])).await.unwrap();
    assert_eq!(stock(&db, "P1").await, 0);

    let edited = db
        .ledger()
        .edit_order(&order.id, &lines(&[("P1", 3)]))
        .await
        .unwrap();
    assert_eq!(edited.items[0].quantity, 3);
    assert_eq!(stock(&db, "P1").await, 0);
}

#[tokio::test]
async fn rejected_refunds_change_nothing() {
    let db = store_with(&[("P1", 1000, 5), ("P2", 500, 5)]).await;
    let order = db.ledger().create_order(&lines(&[("P1", 2)])).await.unwrap();
    let ledger = db.ledger();

    let zero = ledger
        .refund_order(&order.id, &refund(&[("P1", 0)]))
        .await
        .unwrap_err();
    assert_eq!(zero.as_domain(), Some(&CoreError::EmptyRefund));

    let empty = ledger
        .refund_order(&order.id, &RefundRequest::new())
        .await
        .unwrap_err();
    assert_eq!(empty.as_domain(), Some(&CoreError::EmptyRefund));

    for bad in [refund(&[("P1", 3)]), refund(&[("P1", -1)]), refund(&[("P2", 1)])] {
        let err = ledger.refund_order(&order.id, &bad).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::Validation(_))));
    }

    assert_eq!(stock(&db, "P1").await, 3);
    assert_eq!(db.orders().get(&order.id).await.unwrap().unwrap(), order);
}

#[tokio::test]
async fn create_then_delete_restores_stock_exactly() {
    let db = store_with(&[("P1", 1000, 5), ("P2", 500, 4)]).await;
    let order = db
        .ledger()
        .create_order(&lines(&[("P2", 4), ("P1", 1)]))
        .await
        .unwrap();

    db.ledger().delete_order(&order.id).await.unwrap();

    assert_eq!(stock(&db, "P1").await, 5);
    assert_eq!(stock(&db, "P2").await, 4);
    assert_eq!(db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn conservation_over_a_sequence() {
    let db = store_with(&[("P1", 1000, 10), ("P2", 250, 8)]).await;
    let ledger = db.ledger();

    let a = ledger.create_order(&lines(&[("P1", 3), ("P2", 2)])).await.unwrap();
    let b = ledger.create_order(&lines(&[("P2", 5)])).await.unwrap();
    ledger.edit_order(&a.id, &lines(&[("P1", 1), ("P2", 3)])).await.unwrap();
    ledger.refund_order(&b.id, &refund(&[("P2", 2)])).await.unwrap();
    let _ = ledger.create_order(&lines(&[("P1", 50)])).await.unwrap_err();
    let c = ledger.create_order(&lines(&[("P1", 4)])).await.unwrap();
    ledger.delete_order(&c.id).await.unwrap();

    assert_eq!(accounted_units(&db, "P1").await, 10);
    assert_eq!(accounted_units(&db, "P2").await, 8);

    for order in db.orders().list().await.unwrap() {
        assert_eq!(order.total(), order.items_total());
    }
}

// =============================================================================
// Dangling products and snapshots
// =============================================================================

#[tokio::test]
async fn deleted_product_is_skipped_on_reversal() {
    let db = store_with(&[("P1", 1000, 5), ("P2", 500, 5)]).await;
    let order = db
        .ledger()
        .create_order(&lines(&[("P1", 2), ("P2", 1)]))
        .await
        .unwrap();
    db.products().delete("P2").await.unwrap();

    let outcome = db
        .ledger()
        .refund_order(&order.id, &refund(&[("P2", 1)]))
        .await
        .unwrap();
    assert_eq!(outcome.refunded, Money::from_cents(500));
    assert_eq!(stock(&db, "P1").await, 3);

    db.ledger().delete_order(&order.id).await.unwrap();
    assert_eq!(stock(&db, "P1").await, 5);
}

#[tokio::test]
async fn new_lines_for_a_missing_product_are_not_found() {
    let db = store_with(&[("P1", 1000, 5)]).await;
    let order = db.ledger().create_order(&lines(&[("P1", 1)])).await.unwrap();

    let err = db
        .ledger()
        .edit_order(&order.id, &lines(&[("P9", 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&CoreError::ProductNotFound("P9".into())));
    assert_eq!(stock(&db, "P1").await, 4);
}

#[tokio::test]
async fn repricing_does_not_change_existing_orders() {
    let db = store_with(&[("P1", 1000, 5)]).await;
    let order = db.ledger().create_order(&lines(&[("P1", 2)])).await.unwrap();

    let repriced = ProductDraft::new("P1", "Renamed", Money::zero(), Money::from_cents(9999), 3);
    db.products().edit(&repriced).await.unwrap();

    let stored = db.orders().get(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.total(), Money::from_cents(2000));
    assert_eq!(stored.items[0].name_snapshot, "P1 item");

    // Refund pays back what was charged, not today's price
    let outcome = db
        .ledger()
        .refund_order(&order.id, &refund(&[("P1", 1)]))
        .await
        .unwrap();
    assert_eq!(outcome.refunded, Money::from_cents(1000));
}

// =============================================================================
// Out-of-range values
// =============================================================================

fn is_too_large(err: &DbError) -> bool {
    matches!(
        err.as_domain(),
        Some(CoreError::Validation(ValidationError::InvalidFormat { reason, .. }))
            if reason == "too large"
    )
}

#[tokio::test]
async fn repeated_lines_summing_past_i64_are_rejected() {
    let db = store_with(&[("P1", 1000, 5)]).await;

    let err = db
        .ledger()
        .create_order(&lines(&[("P1", i64::MAX), ("P1", 1)]))
        .await
        .unwrap_err();

    assert!(is_too_large(&err));
    assert_eq!(stock(&db, "P1").await, 5);
    assert_eq!(db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn restock_past_i64_is_rejected() {
    let db = store_with(&[("P1", 1000, 5)]).await;

    let err = db.ledger().adjust_stock("P1", i64::MAX).await.unwrap_err();

    assert!(is_too_large(&err));
    assert_eq!(stock(&db, "P1").await, 5);
}

#[tokio::test]
async fn order_total_past_i64_is_rejected() {
    let db = store_with(&[("P1", i64::MAX, 5)]).await;

    let err = db
        .ledger()
        .create_order(&lines(&[("P1", 2)]))
        .await
        .unwrap_err();

    assert!(is_too_large(&err));
    assert_eq!(stock(&db, "P1").await, 5);
    assert_eq!(db.orders().count().await.unwrap(), 0);
}
