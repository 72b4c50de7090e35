//! # Validation Module
//!
//! Checks for products typed in by a user before they reach the cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Consumer (CLI flags, UI forms)                               │
//! │  ├── Type validation (argument parsing)                                │
//! │  └── THIS MODULE: blank ids/titles, bad prices                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart (gomarket-core::cart)                                   │
//! │  └── No validation; add/increment/decrement never fail                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gomarket_core::validation::validate_product;
//! use gomarket_core::Product;
//!
//! assert!(validate_product(&Product::new("a", "T", "u", 10.0)).is_ok());
//! assert!(validate_product(&Product::new(" ", "T", "u", 10.0)).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product id.
///
/// ## Rules
/// - Must not be empty or whitespace only
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    require("id", id)
}

/// Validates a product title.
///
/// ## Rules
/// - Must not be empty or whitespace only
pub fn validate_title(title: &str) -> ValidationResult<()> {
    require("title", title)
}

/// Validates a catalog price.
///
/// ## Rules
/// - Must be finite (no NaN, no infinity)
/// - Must not be negative (zero is a valid freebie)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "price".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates every user-supplied field of a product.
///
/// `image_url` is not checked; an empty image just renders a placeholder.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_id(&product.id)?;
    validate_title(&product.title)?;
    validate_price(product.price)
}

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}
