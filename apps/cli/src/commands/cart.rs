//! # Cart Commands
//!
//! Commands for reading and editing the cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Line Item Lifecycle                                  │
//! │                                                                         │
//! │  ┌──────────┐  add   ┌──────────┐ increment ┌──────────┐               │
//! │  │ Not in   │───────►│ qty = 1  │──────────►│ qty = n  │◄──┐           │
//! │  │  cart    │        │          │◄──────────│          │───┘ increment │
//! │  └──────────┘        └──────────┘ decrement └──────────┘     / add     │
//! │       ▲                    │                                            │
//! │       └──── decrement ─────┘  (quantity reaches 0: line removed)       │
//! │                                                                         │
//! │  Every change is queued for the persist worker; reads never write.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use gomarket_core::validation::validate_product;
use gomarket_core::{CartTotals, LineItem, Product};
use gomarket_store::{CartContext, CartStore};

use crate::error::ApiError;

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
}

impl From<&CartStore> for CartResponse {
    fn from(store: &CartStore) -> Self {
        let cart = store.snapshot();
        CartResponse {
            totals: cart.totals(),
            items: cart.into_items(),
        }
    }
}

/// Gets the current cart contents.
///
/// ## Returns
/// Current cart with items in insertion order and totals
pub fn get_cart(ctx: &CartContext) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");
    let cart = ctx.use_cart()?;
    Ok(CartResponse::from(cart))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - Product already in cart: quantity goes up by one, stored fields kept
/// - Otherwise: appended at the end with quantity 1
///
/// ## Errors
/// - `VALIDATION_ERROR` for an empty id or title, or a bad price
pub fn add_to_cart(ctx: &CartContext, product: &Product) -> Result<CartResponse, ApiError> {
    debug!(id = %product.id, "add_to_cart command");
    let cart = ctx.use_cart()?;

    validate_product(product)?;
    cart.add_to_cart(product);

    Ok(CartResponse::from(cart))
}

/// Increases a line item's quantity by one.
///
/// Unknown ids leave the cart unchanged.
pub fn increment(ctx: &CartContext, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "increment command");
    let cart = ctx.use_cart()?;
    cart.increment(id);
    Ok(CartResponse::from(cart))
}

/// Decreases a line item's quantity by one.
///
/// ## Behavior
/// - Quantity falls to zero or below: the line item is removed
/// - Unknown ids leave the cart unchanged
pub fn decrement(ctx: &CartContext, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "decrement command");
    let cart = ctx.use_cart()?;
    cart.decrement(id);
    Ok(CartResponse::from(cart))
}
