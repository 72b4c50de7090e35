//! # Cart Context
//!
//! How consumers get hold of the cart.
//!
//! The application builds exactly one [`CartStore`] at startup and wraps it
//! with [`CartContext::provide`]. Every component that needs the cart
//! receives the context by reference and calls [`CartContext::use_cart`].
//! A component handed an empty context fails on its first access instead of
//! silently working against a throwaway cart.
//!
//! ```text
//! startup:   CartStore::open(..) ──► CartContext::provide(store)
//!                                          │
//!                     ┌────────────────────┼────────────────────┐
//!                     ▼                    ▼                    ▼
//!              product list          cart screen          header badge
//!              ctx.use_cart()?       ctx.use_cart()?      ctx.use_cart()?
//! ```

use crate::cart_store::CartStore;
use crate::error::{StoreError, StoreResult};

/// Injection point for the cart store.
#[derive(Debug, Clone, Default)]
pub struct CartContext {
    store: Option<CartStore>,
}

impl CartContext {
    /// A context with a store in scope.
    pub fn provide(store: CartStore) -> Self {
        CartContext { store: Some(store) }
    }

    /// A context with no store; `use_cart` on it fails.
    pub fn empty() -> Self {
        CartContext::default()
    }

    /// Returns the provided store.
    ///
    /// ## Errors
    /// [`StoreError::ProviderMissing`] when no store was provided.
    pub fn use_cart(&self) -> StoreResult<&CartStore> {
        self.store.as_ref().ok_or(StoreError::ProviderMissing)
    }

    /// Checks whether a store is in scope.
    pub fn is_provided(&self) -> bool {
        self.store.is_some()
    }
}
