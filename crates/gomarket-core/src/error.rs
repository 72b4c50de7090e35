//! # Error Types
//!
//! Domain-specific error types for gomarket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gomarket-core errors (this file)                                      │
//! │  ├── CoreError        - Cart blob and domain errors                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  gomarket-store errors (separate crate)                                │
//! │  └── StoreError       - Storage, config and provider failures          │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the consumer sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these ever escape a cart mutation: add/increment/decrement are
//! infallible. They surface when decoding stored blobs and when checking
//! user input at the consumer boundary.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core cart errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored cart blob could not be decoded.
    ///
    /// ## When This Occurs
    /// - The blob is not JSON
    /// - An entry is missing a field (e.g. `quantity`)
    /// - A field has the wrong type
    ///
    /// The store treats this as "no prior cart".
    #[error("Malformed cart data: {0}")]
    MalformedCart(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
