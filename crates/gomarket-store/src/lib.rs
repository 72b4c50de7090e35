//! # gomarket-store: Cart Store and Device Persistence
//!
//! This crate owns the cart at runtime. It loads the cart once from
//! device-local key-value storage, applies the mutations from
//! `gomarket-core`, and mirrors every change back through a single writer.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarketplace Cart Data Flow                     │
//! │                                                                         │
//! │  Consumer (CLI command, UI component)                                  │
//! │       │  ctx.use_cart()?.add_to_cart(&product)                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  gomarket-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │  CartContext  │───►│   CartStore   │───►│PersistWorker │   │   │
//! │  │   │ (context.rs)  │    │(cart_store.rs)│    │ (persist.rs) │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────┬───────┘   │   │
//! │  │                                                    │           │   │
//! │  │                         ┌──────────────────────────▼────────┐  │   │
//! │  │                         │ dyn KeyValueStorage (storage/)    │  │   │
//! │  │                         │ SqliteStorage │ MemoryStorage     │  │   │
//! │  │                         └───────────────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite key_value_store, key "@GoMarketplace:products"          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`storage`] - Key-value storage trait and backends
//! - [`migrations`] - Embedded SQLite migrations
//! - [`persist`] - Single-writer persist queue
//! - [`cart_store`] - The cart store itself
//! - [`context`] - Injection point for consumers
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gomarket_store::{CartContext, CartStore, SqliteStorage, StoreConfig};
//!
//! let config = StoreConfig::load(None)?;
//! let storage = Arc::new(SqliteStorage::open(config.storage_config()).await?);
//! let store = CartStore::open(storage, &config.cart_store_config()).await;
//! let ctx = CartContext::provide(store);
//!
//! ctx.use_cart()?.increment("sku-1");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart_store;
pub mod config;
pub mod context;
pub mod error;
pub mod migrations;
pub mod persist;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart_store::{CartStore, CartStoreConfig};
pub use config::StoreConfig;
pub use context::CartContext;
pub use error::{StoreError, StoreResult};
pub use persist::{PersistMode, PersistStats};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageConfig};
