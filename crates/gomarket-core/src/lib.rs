//! # gomarket-core: Pure Cart Logic for GoMarketplace
//!
//! This crate holds the cart itself: the line item types and the three
//! mutations the storefront performs on them. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GoMarketplace Cart Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Consumers (mobile UI, gomarket CLI)                │   │
//! │  │        product list ──► cart screen ──► quantity buttons        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartContext::use_cart()                │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                gomarket-store (CartStore)                       │   │
//! │  │        mutex-guarded Cart + single-writer persist queue         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                   │   │
//! │  │   │   types   │  │   cart    │  │ validation│                   │   │
//! │  │   │  Product  │  │   Cart    │  │   rules   │                   │   │
//! │  │   │  LineItem │  │  Totals   │  │  checks   │                   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, LineItem)
//! - [`cart`] - The ordered cart and its add/increment/decrement rules
//! - [`error`] - Domain error types
//! - [`validation`] - Input checks for user-typed products
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{Cart, Product};
//!
//! let mut cart = Cart::new();
//! let product = Product::new("a", "T", "u", 10.0);
//!
//! cart.add_to_cart(&product);
//! cart.add_to_cart(&product);
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.items()[0].quantity, 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{LineItem, Product};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Key the cart blob is stored under in the device key-value store.
///
/// The `@GoMarketplace:` prefix namespaces the app's entries so the cart
/// never collides with other keys in shared storage.
pub const CART_STORAGE_KEY: &str = "@GoMarketplace:products";
