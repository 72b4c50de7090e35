//! # Storage Module
//!
//! Device-local key-value persistence.
//!
//! ## Storage Abstraction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Key-Value Storage                                    │
//! │                                                                         │
//! │  CartStore / PersistWorker                                             │
//! │       │                                                                 │
//! │       │  storage.get_item("@GoMarketplace:products")                   │
//! │       │  storage.set_item("@GoMarketplace:products", "[...]")          │
//! │       ▼                                                                 │
//! │  dyn KeyValueStorage                                                   │
//! │  ├── SqliteStorage  - key_value_store table (device default)           │
//! │  └── MemoryStorage  - HashMap (tests, embedding)                       │
//! │                                                                         │
//! │  Values are opaque strings; callers own the encoding.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Asynchronous string key-value store.
///
/// Implementations must be safe to share between the store and its persist
/// task.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads the value stored under `key`, `None` if the key was never set.
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
}

pub use memory::MemoryStorage;
pub use sqlite::{SqliteStorage, StorageConfig};
