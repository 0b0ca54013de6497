//! Cart behavior across the serialization boundary.
//!
//! The cart round-trips through the session as JSON; these tests pin the
//! invariants the checkout flow relies on: quantities never reach zero,
//! totals use exact decimal arithmetic, and corrupt stored data degrades to
//! an empty cart instead of an error.

use canteen_core::{Cart, ItemId, ItemSnapshot};
use rust_decimal::Decimal;

fn snapshot(id: i32, name: &str, price: i64) -> ItemSnapshot {
    ItemSnapshot {
        id: ItemId::new(id),
        name: name.to_string(),
        price: Decimal::from(price),
        image_url: Some(format!("https://cdn.campus.test/{id}.jpg")),
    }
}

// =============================================================================
// Quantity Invariant
// =============================================================================

#[test]
fn test_quantities_stay_positive_under_any_sequence() {
    let item_a = snapshot(1, "Item A", 100);
    let item_b = snapshot(2, "Item B", 50);

    let mut cart = Cart::new();
    let sequences: &[(i32, i64)] = &[
        (1, 1),
        (1, -1),
        (2, 3),
        (1, -10),
        (2, -2),
        (2, -2),
        (1, 2),
        (2, 1),
    ];

    for &(which, delta) in sequences {
        let item = if which == 1 { &item_a } else { &item_b };
        cart.update_quantity(item, delta);
        for entry in cart.entries() {
            assert!(entry.qty >= 1, "cart held an entry with qty < 1");
        }
    }

    assert_eq!(cart.qty_of(item_a.id), 2);
    assert_eq!(cart.qty_of(item_b.id), 1);
}

// =============================================================================
// Pricing Scenario
// =============================================================================

#[test]
fn test_service_charge_scenario() {
    // {ItemA (100, qty 2), ItemB (50, qty 1)}:
    // subtotal 250, service charge 12.5, total 262.5
    let mut cart = Cart::new();
    cart.update_quantity(&snapshot(1, "Item A", 100), 2);
    cart.update_quantity(&snapshot(2, "Item B", 50), 1);

    assert_eq!(cart.subtotal(), Decimal::from(250));
    assert_eq!(cart.service_charge(), Decimal::new(125, 1));
    assert_eq!(cart.total(), Decimal::new(2625, 1));
}

// =============================================================================
// Round-Trip & Corruption Tolerance
// =============================================================================

#[test]
fn test_serialized_cart_reproduces_the_same_map() {
    let mut cart = Cart::new();
    cart.update_quantity(&snapshot(7, "Masala Dosa", 60), 2);
    cart.update_quantity(&snapshot(9, "Chai", 15), 3);

    let stored = serde_json::to_string(&cart).expect("serialize");
    let restored: Cart = serde_json::from_str(&stored).expect("deserialize");

    assert_eq!(restored, cart);
    assert_eq!(restored.qty_of(ItemId::new(7)), 2);
    assert_eq!(restored.total(), cart.total());
}

#[test]
fn test_corrupt_stored_cart_is_rejected_cleanly() {
    // The session boundary maps a failed deserialize to Cart::new(); the
    // important part is that it's an Err, never a panic or a half-cart.
    for corrupt in [
        "not json",
        "[1, 2, 3]",
        r#"{"7": {"item": "nope", "qty": 1}}"#,
        r#"{"7": {"qty": 2}}"#,
    ] {
        let parsed: Result<Cart, _> = serde_json::from_str(corrupt);
        assert!(parsed.is_err(), "accepted corrupt cart: {corrupt}");
    }

    let empty: Cart = serde_json::from_str("{}").expect("empty map is a valid cart");
    assert!(empty.is_empty());
}
