//! # Cart
//!
//! The ordered list of line items and the three mutations on it.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Operations                                  │
//! │                                                                         │
//! │  add_to_cart(P) ──► P.id in cart? ──yes──► increment(P.id)             │
//! │                          │                                              │
//! │                          no                                             │
//! │                          ▼                                              │
//! │                     push LineItem::from_product(P)   (quantity = 1)    │
//! │                                                                         │
//! │  increment(id) ───► matching item: quantity + 1                        │
//! │                                                                         │
//! │  decrement(id) ───► matching item: quantity - 1                        │
//! │                     then drop every item with quantity <= 0            │
//! │                                                                         │
//! │  Every mutation reports whether the sequence changed, so callers can   │
//! │  skip persisting no-ops.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Insertion order is preserved; new items are appended
//! - Items are unique by `id` (adding an existing product increments it)
//! - Quantities stay >= 1 for items produced by these operations

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::types::{LineItem, Product};

/// The shopping cart.
///
/// Serializes transparently as the JSON array of its items, which is the
/// persisted format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from already-ordered items.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Cart { items }
    }

    /// Decodes a persisted cart blob.
    pub fn from_json(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encodes the cart in its persisted form.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns the items in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Looks up an item by id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Checks whether a product is already in the cart.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Adds a product, or increments it if already present.
    ///
    /// ## Behavior
    /// - Product already in cart: same as `increment(&product.id)`
    /// - Product not in cart: appended as a new item with quantity 1
    ///
    /// Always changes the cart; returns `true` for symmetry with the other
    /// mutations.
    pub fn add_to_cart(&mut self, product: &Product) -> bool {
        if self.contains(&product.id) {
            return self.increment(&product.id);
        }

        self.items.push(LineItem::from_product(product));
        true
    }

    /// Increases the quantity of the item with `id` by one.
    ///
    /// Returns `false` (and leaves the cart untouched) if no item matches.
    pub fn increment(&mut self, id: &str) -> bool {
        let mut changed = false;

        for item in self.items.iter_mut().filter(|item| item.id == id) {
            *item = item.with_quantity_delta(1);
            changed = true;
        }

        changed
    }

    /// Decreases the quantity of the item with `id` by one.
    ///
    /// ## Behavior
    /// - Quantity 1 → item is removed
    /// - Quantity > 1 → quantity - 1
    /// - Afterwards any item with quantity <= 0 is removed, whatever its id
    ///
    /// Returns `true` if anything was changed or removed.
    pub fn decrement(&mut self, id: &str) -> bool {
        let mut changed = false;

        for item in self.items.iter_mut().filter(|item| item.id == id) {
            *item = item.with_quantity_delta(-1);
            changed = true;
        }

        let before = self.items.len();
        self.items.retain(|item| item.quantity > 0);

        changed || self.items.len() != before
    }

    /// Returns the number of distinct items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all items, saturating at `i64::MAX`.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.quantity)
            .fold(0i64, i64::saturating_add)
    }

    /// Returns the count summary for display.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

/// Cart count summary for consumers (badge counts, headers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Distinct products in the cart.
    #[ts(type = "number")]
    pub item_count: usize,

    /// Sum of all quantities.
    #[ts(type = "number")]
    pub total_quantity: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.len(),
            total_quantity: cart.total_quantity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product::new(id, format!("Product {}", id), format!("https://img/{}.png", id), 10.0)
    }

    fn item(id: &str, quantity: i64) -> LineItem {
        LineItem {
            quantity,
            ..LineItem::from_product(&product(id))
        }
    }

    fn quantities(cart: &Cart) -> Vec<(&str, i64)> {
        cart.items()
            .iter()
            .map(|i| (i.id.as_str(), i.quantity))
            .collect()
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = Cart::new();
        let p = Product::new("a", "T", "u", 10.0);

        assert!(cart.add_to_cart(&p));

        assert_eq!(
            cart.items(),
            &[LineItem {
                id: "a".to_string(),
                title: "T".to_string(),
                image_url: "u".to_string(),
                price: 10.0,
                quantity: 1,
            }]
        );
    }

    #[test]
    fn test_add_appends_after_existing_items() {
        let mut cart = Cart::from_items(vec![item("x", 3), item("y", 1)]);

        cart.add_to_cart(&product("z"));

        assert_eq!(quantities(&cart), vec![("x", 3), ("y", 1), ("z", 1)]);
    }

    #[test]
    fn test_add_existing_product_increments_instead_of_duplicating() {
        let mut added = Cart::from_items(vec![item("a", 2), item("b", 1)]);
        let mut incremented = added.clone();

        added.add_to_cart(&product("a"));
        incremented.increment("a");

        assert_eq!(added, incremented);
        assert_eq!(quantities(&added), vec![("a", 3), ("b", 1)]);
    }

    #[test]
    fn test_add_keeps_first_seen_fields_for_existing_item() {
        let mut cart = Cart::new();
        cart.add_to_cart(&Product::new("a", "Old", "u", 10.0));
        cart.add_to_cart(&Product::new("a", "New", "v", 12.0));

        let stored = cart.get("a").unwrap();
        assert_eq!(stored.title, "Old");
        assert_eq!(stored.price, 10.0);
        assert_eq!(stored.quantity, 2);
    }

    #[test]
    fn test_increment_leaves_others_identical() {
        let mut cart = Cart::from_items(vec![item("a", 2), item("b", 1)]);
        let b_before = cart.get("b").cloned();

        assert!(cart.increment("a"));

        assert_eq!(quantities(&cart), vec![("a", 3), ("b", 1)]);
        assert_eq!(cart.get("b").cloned(), b_before);
    }

    #[test]
    fn test_decrement_last_unit_removes_item() {
        let mut cart = Cart::from_items(vec![item("a", 1)]);

        assert!(cart.decrement("a"));

        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_above_one_reduces_quantity() {
        let mut cart = Cart::from_items(vec![item("a", 4), item("b", 1)]);

        assert!(cart.decrement("a"));

        assert_eq!(quantities(&cart), vec![("a", 3), ("b", 1)]);
    }

    #[test]
    fn test_absent_id_is_a_noop() {
        let mut cart = Cart::from_items(vec![item("a", 2)]);
        let before = cart.clone();

        assert!(!cart.increment("missing"));
        assert!(!cart.decrement("missing"));

        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_drops_non_positive_items_regardless_of_id() {
        // Only reachable through hand-edited storage
        let mut cart = Cart::from_items(vec![item("a", 2), item("broken", 0)]);

        assert!(cart.decrement("missing"));

        assert_eq!(quantities(&cart), vec![("a", 2)]);
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let cart = Cart::from_items(vec![item("b", 2), item("a", 1), item("c", 7)]);

        let raw = cart.to_json().unwrap();
        let restored = Cart::from_json(&raw).unwrap();

        assert_eq!(restored, cart);
        assert!(raw.starts_with('['));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Cart::from_json("{not json").is_err());
        assert!(Cart::from_json(r#"[{"id":"a"}]"#).is_err());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from_items(vec![item("a", 2), item("b", 3)]);

        assert_eq!(
            cart.totals(),
            CartTotals {
                item_count: 2,
                total_quantity: 5,
            }
        );
    }

    #[test]
    fn test_quantities_near_i64_max_saturate() {
        let mut cart = Cart::from_items(vec![item("a", i64::MAX), item("b", 1)]);

        assert_eq!(cart.total_quantity(), i64::MAX);
        assert_eq!(cart.totals().item_count, 2);

        assert!(cart.increment("a"));
        assert_eq!(cart.get("a").unwrap().quantity, i64::MAX);

        // The item must survive a decrement instead of wrapping negative
        assert!(cart.decrement("a"));
        assert_eq!(cart.get("a").unwrap().quantity, i64::MAX - 1);
    }
}
