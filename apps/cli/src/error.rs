//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in gomarket                               │
//! │                                                                         │
//! │  Command Function → Result<T, ApiError>                                │
//! │         │                                                               │
//! │         ├── StoreError::ProviderMissing ──► CONFIGURATION_ERROR         │
//! │         ├── StoreError::QueryFailed ──────► STORAGE_ERROR (logged)      │
//! │         ├── ValidationError ──────────────► VALIDATION_ERROR            │
//! │         └── anything else ────────────────► INTERNAL                    │
//! │                                                                         │
//! │  stderr: {"code":"VALIDATION_ERROR","message":"price must not be..."}  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures while persisting are NOT here: the store logs those and
//! keeps the cart in memory. Only failures to open storage or read config
//! reach the user.

use gomarket_core::{CoreError, ValidationError};
use gomarket_store::StoreError;
use serde::Serialize;

/// API error returned from CLI commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFIGURATION_ERROR",
///   "message": "use_cart must be used within a CartProvider"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing store or bad configuration
    ConfigurationError,

    /// Input validation failed
    ValidationError,

    /// Storage could not be opened or queried
    StorageError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ConfigurationError, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// JSON form printed on stderr.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProviderMissing => ApiError::configuration(err.to_string()),
            StoreError::InvalidConfig(_) | StoreError::ConfigLoadFailed(_) => {
                ApiError::configuration(err.to_string())
            }
            StoreError::ConnectionFailed(e) => {
                tracing::error!("Storage connection failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Could not open cart storage")
            }
            StoreError::MigrationFailed(e) => {
                tracing::error!("Storage migration failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Cart storage migration failed")
            }
            StoreError::QueryFailed(e) => {
                tracing::error!("Storage query failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Cart storage operation failed")
            }
            StoreError::PoolExhausted => {
                ApiError::new(ErrorCode::StorageError, "Cart storage is busy")
            }
            StoreError::Io(e) => {
                tracing::error!("Storage IO error: {}", e);
                ApiError::new(ErrorCode::StorageError, "Cart storage is not accessible")
            }
            StoreError::Serialization(_)
            | StoreError::PersistWorkerStopped
            | StoreError::Internal(_) => {
                tracing::error!("Internal store error: {}", err);
                ApiError::internal("Cart operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::MalformedCart(e) => {
                tracing::error!("Malformed cart data: {}", e);
                ApiError::internal("Cart data is malformed")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_missing_is_configuration_error() {
        let err = ApiError::from(StoreError::ProviderMissing);
        assert_eq!(err.code, ErrorCode::ConfigurationError);
        assert_eq!(err.message, "use_cart must be used within a CartProvider");
    }

    #[test]
    fn test_json_shape() {
        let err = ApiError::validation("price must not be negative");
        assert_eq!(
            err.to_json(),
            r#"{"code":"VALIDATION_ERROR","message":"price must not be negative"}"#
        );
    }

    #[test]
    fn test_storage_details_are_not_leaked() {
        let err = ApiError::from(StoreError::QueryFailed("disk I/O error at page 7".into()));
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("page 7"));
    }
}
