//! # Commands Module
//!
//! Everything the `gomarket` binary can do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (dispatch)
//! ├── cart.rs     ◄─── show / add / increment / decrement
//! └── config.rs   ◄─── effective configuration
//! ```
//!
//! ## Context Injection
//! Cart commands receive the [`CartContext`] and ask it for the store; they
//! never build one themselves:
//! ```rust,ignore
//! pub fn increment(ctx: &CartContext, id: &str) -> Result<CartResponse, ApiError> {
//!     let cart = ctx.use_cart()?;   // CONFIGURATION_ERROR if nothing provided
//!     cart.increment(id);
//!     Ok(CartResponse::from(cart))
//! }
//! ```

pub mod cart;
pub mod config;

use gomarket_core::Product;
use gomarket_store::CartContext;

use crate::cli::Command;
use crate::error::ApiError;

pub use cart::CartResponse;

/// Runs a cart command against the provided context.
///
/// `Command::Config` does not touch the cart and is rejected here; the
/// caller answers it before opening storage.
pub fn execute(ctx: &CartContext, command: &Command) -> Result<CartResponse, ApiError> {
    match command {
        Command::Show => cart::get_cart(ctx),
        Command::Add(args) => cart::add_to_cart(ctx, &Product::from(args)),
        Command::Increment { id } => cart::increment(ctx, id),
        Command::Decrement { id } => cart::decrement(ctx, id),
        Command::Config => Err(ApiError::internal("config is not a cart command")),
    }
}
