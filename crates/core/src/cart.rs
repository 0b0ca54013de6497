//! The shopping cart model and its pricing rules.
//!
//! The cart is a plain map from item id to `{snapshot, quantity}`. It is pure
//! domain state: persistence (the session) and catalog lookups live in the
//! server crate. Prices inside the cart are snapshots taken when the item was
//! added, so a later catalog price change does not reprice an open cart.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, ItemId, Price};

/// Service charge applied on top of the cart subtotal, in percent.
pub const SERVICE_CHARGE_PERCENT: i64 = 5;

/// The cart's frozen copy of a catalog item.
///
/// Carried into the gateway order's line items and, via the webhook payload,
/// into the persisted `order_items` price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// One cart line: an item snapshot and how many of it.
///
/// Invariant: `qty >= 1`. [`Cart::update_quantity`] removes the entry before
/// the quantity can reach zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub item: ItemSnapshot,
    pub qty: u32,
}

impl CartEntry {
    /// Line total: snapshot price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.item.price * Decimal::from(self.qty)
    }
}

/// A shopping cart: item id -> entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: BTreeMap<ItemId, CartEntry>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the quantity of `item` (negative to remove).
    ///
    /// If the resulting quantity is zero or less, the entry is removed
    /// entirely. Pure over the map: no side effects beyond the map itself;
    /// the caller persists the cart after every change.
    pub fn update_quantity(&mut self, item: &ItemSnapshot, delta: i64) {
        let current = self.entries.get(&item.id).map_or(0, |e| i64::from(e.qty));
        let next = current + delta;
        if next <= 0 {
            self.entries.remove(&item.id);
        } else {
            let qty = u32::try_from(next).unwrap_or(u32::MAX);
            self.entries.insert(
                item.id,
                CartEntry {
                    item: item.clone(),
                    qty,
                },
            );
        }
    }

    /// Remove an entry regardless of its quantity.
    pub fn remove(&mut self, item_id: ItemId) {
        self.entries.remove(&item_id);
    }

    /// Drop every entry (successful checkout, logout).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current quantity for an item, zero if absent.
    #[must_use]
    pub fn qty_of(&self, item_id: ItemId) -> u32 {
        self.entries.get(&item_id).map_or(0, |e| e.qty)
    }

    /// Iterate over entries in item-id order.
    pub fn entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.values()
    }

    /// True when the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.entries.len()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries.values().map(|e| e.qty).sum()
    }

    /// Sum of line totals, before the service charge.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.entries.values().map(CartEntry::line_total).sum()
    }

    /// The fixed-percentage service charge on the subtotal.
    #[must_use]
    pub fn service_charge(&self) -> Decimal {
        self.subtotal() * Decimal::new(SERVICE_CHARGE_PERCENT, 2)
    }

    /// Amount charged at checkout: subtotal plus service charge.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal() + self.service_charge()
    }

    /// The checkout total as a [`Price`] in the gateway currency.
    #[must_use]
    pub fn total_price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.total(), currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: i32, name: &str, price: i64) -> ItemSnapshot {
        ItemSnapshot {
            id: ItemId::new(id),
            name: name.to_string(),
            price: Decimal::from(price),
            image_url: None,
        }
    }

    #[test]
    fn test_update_quantity_adds_and_removes() {
        let mut cart = Cart::new();
        let dosa = snapshot(1, "Masala Dosa", 60);

        cart.update_quantity(&dosa, 1);
        assert_eq!(cart.qty_of(dosa.id), 1);

        cart.update_quantity(&dosa, 2);
        assert_eq!(cart.qty_of(dosa.id), 3);

        cart.update_quantity(&dosa, -3);
        assert_eq!(cart.qty_of(dosa.id), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_no_sequence_yields_nonpositive_qty() {
        // Exhaustive-ish walk over add/remove sequences: the invariant is
        // that entries never exist with qty == 0 and decrements below zero
        // just delete the entry.
        let item = snapshot(9, "Chai", 15);
        let deltas: &[i64] = &[1, -1, -1, 2, -5, 3, 1, -2, -2, 4];
        let mut cart = Cart::new();
        for &d in deltas {
            cart.update_quantity(&item, d);
            for entry in cart.entries() {
                assert!(entry.qty >= 1);
            }
        }
        // Running sum with clamp-to-removal: 1,0,0,2,0,3,4,2,0,4
        assert_eq!(cart.qty_of(item.id), 4);
    }

    #[test]
    fn test_removing_absent_item_is_noop() {
        let mut cart = Cart::new();
        cart.update_quantity(&snapshot(5, "Idli", 30), -1);
        assert!(cart.is_empty());
        cart.remove(ItemId::new(5));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_with_service_charge() {
        // cart = {ItemA (price 100, qty 2), ItemB (price 50, qty 1)}
        // -> subtotal 250, service charge (5%) 12.5, total 262.5
        let mut cart = Cart::new();
        cart.update_quantity(&snapshot(1, "Item A", 100), 2);
        cart.update_quantity(&snapshot(2, "Item B", 50), 1);

        assert_eq!(cart.subtotal(), Decimal::from(250));
        assert_eq!(cart.service_charge(), Decimal::new(125, 1));
        assert_eq!(cart.total(), Decimal::new(2625, 1));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_price_is_snapshot_not_live() {
        let mut cart = Cart::new();
        let before = snapshot(3, "Thali", 120);
        cart.update_quantity(&before, 1);

        // A later add with a repriced snapshot replaces the stored snapshot;
        // until then the old price stands.
        assert_eq!(cart.subtotal(), Decimal::from(120));
        let repriced = ItemSnapshot {
            price: Decimal::from(140),
            ..before
        };
        cart.update_quantity(&repriced, 1);
        assert_eq!(cart.subtotal(), Decimal::from(280));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut cart = Cart::new();
        cart.update_quantity(&snapshot(1, "Samosa", 20), 2);
        cart.update_quantity(&snapshot(2, "Lassi", 45), 1);

        let json = serde_json::to_string(&cart).expect("serialize");
        let back: Cart = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cart);
    }

    #[test]
    fn test_corrupt_json_is_an_error_not_a_panic() {
        // The session layer maps this error to an empty cart.
        let corrupt: Result<Cart, _> = serde_json::from_str("{\"1\": \"not-an-entry\"}");
        assert!(corrupt.is_err());
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let cart = Cart::new();
        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert_eq!(cart.service_charge(), Decimal::ZERO);
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
