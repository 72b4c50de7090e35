//! # Domain Types
//!
//! The two shapes the cart deals in.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   LineItem::from_product   ┌─────────────────┐    │
//! │  │    Product      │ ─────────────────────────► │    LineItem     │    │
//! │  │  ─────────────  │      (copy, quantity 1)    │  ─────────────  │    │
//! │  │  id             │                            │  id             │    │
//! │  │  title          │                            │  title          │    │
//! │  │  image_url      │                            │  image_url      │    │
//! │  │  price          │                            │  price          │    │
//! │  └─────────────────┘                            │  quantity ≥ 1   │    │
//! │                                                 └─────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! A persisted cart is a JSON array of `LineItem`:
//! ```json
//! [{"id":"a","title":"T","image_url":"u","price":10.0,"quantity":1}]
//! ```
//! Field names are snake_case on the wire, matching the storefront's catalog.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Product
// =============================================================================

/// A catalog product as handed to `add_to_cart`.
///
/// `title`, `image_url` and `price` are opaque to the cart: they are carried
/// along for display and never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Catalog identifier; the cart's unique key.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Product image location.
    pub image_url: String,

    /// Unit price as published by the catalog.
    pub price: f64,
}

impl Product {
    /// Creates a product.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Product {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart.
///
/// ## Invariants
/// - `quantity >= 1` while the item is in a cart
/// - `id` is unique within a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,

    /// Units of this product in the cart.
    #[ts(type = "number")]
    pub quantity: i64,
}

impl LineItem {
    /// Creates a fresh line item from a product with quantity 1.
    ///
    /// The product is borrowed and copied; the caller's value is left as is.
    pub fn from_product(product: &Product) -> Self {
        LineItem {
            id: product.id.clone(),
            title: product.title.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            quantity: 1,
        }
    }

    /// Returns a copy with the quantity shifted by `delta`, saturating at
    /// the `i64` bounds.
    pub fn with_quantity_delta(&self, delta: i64) -> Self {
        LineItem {
            quantity: self.quantity.saturating_add(delta),
            ..self.clone()
        }
    }

    /// Returns the product part of this item (everything but the quantity).
    pub fn product(&self) -> Product {
        Product {
            id: self.id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
        }
    }
}
