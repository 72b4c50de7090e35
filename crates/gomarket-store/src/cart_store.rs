//! # Cart Store
//!
//! The application's single cart: loaded once from storage, mutated through
//! three operations, mirrored back to storage after every change.
//!
//! ## Thread Safety
//! The cart sits behind a `Mutex` inside an `Arc`, so handles are cheap to
//! clone and can be passed to every consumer. Each mutation holds the lock
//! while it edits the cart AND enqueues the resulting snapshot, which makes
//! the persist queue order identical to the mutation order.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CartStore Lifecycle                                │
//! │                                                                         │
//! │  CartStore::open(storage, config)                                      │
//! │       │                                                                 │
//! │       ├── storage.get_item(key)                                        │
//! │       │     • Some(valid json) → cart = stored items                   │
//! │       │     • None             → cart = []                             │
//! │       │     • malformed / err  → cart = [] (logged)                    │
//! │       │     (loading never writes back)                                │
//! │       │                                                                 │
//! │       └── spawn PersistWorker                                          │
//! │                                                                         │
//! │  add_to_cart / increment / decrement                                   │
//! │       │                                                                 │
//! │       ├── lock cart, apply Cart rule                                   │
//! │       └── changed? → enqueue Snapshot { revision, json }               │
//! │                                                                         │
//! │  products() → copy of items        flush() → wait for queued writes    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gomarket_core::{Cart, CartTotals, LineItem, Product, CART_STORAGE_KEY};
use tracing::{debug, error, info, warn};

use crate::error::StoreResult;
use crate::persist::{PersistHandle, PersistMode, PersistStats, PersistWorker, Snapshot};
use crate::storage::KeyValueStorage;

// =============================================================================
// Configuration
// =============================================================================

/// Settings for one cart store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStoreConfig {
    /// Storage key holding the cart blob.
    pub storage_key: String,

    /// How the persist worker treats a backlog of snapshots.
    pub persist_mode: PersistMode,
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        CartStoreConfig {
            storage_key: CART_STORAGE_KEY.to_string(),
            persist_mode: PersistMode::default(),
        }
    }
}

impl CartStoreConfig {
    /// Sets the storage key.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the persist mode.
    pub fn persist_mode(mut self, mode: PersistMode) -> Self {
        self.persist_mode = mode;
        self
    }
}

// =============================================================================
// Cart Store
// =============================================================================

struct CartSlot {
    cart: Cart,
    revision: u64,
}

struct Inner {
    slot: Mutex<CartSlot>,
    persist: PersistHandle,
    stats: Arc<PersistStats>,
    storage_key: String,
}

/// Handle to the application's cart.
///
/// ## Usage
/// ```rust,ignore
/// let store = CartStore::open(storage, &CartStoreConfig::default()).await;
/// store.add_to_cart(&product);
/// store.increment(&product.id);
/// let items = store.products();
/// store.flush().await?;
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("storage_key", &self.inner.storage_key)
            .field("items", &self.len())
            .finish()
    }
}

impl CartStore {
    /// Loads the persisted cart and starts the persist worker.
    ///
    /// Never fails: unreadable or malformed storage yields an empty cart.
    /// Must be called from within a Tokio runtime.
    pub async fn open(storage: Arc<dyn KeyValueStorage>, config: &CartStoreConfig) -> Self {
        let cart = load_cart(storage.as_ref(), &config.storage_key).await;

        let stats = Arc::new(PersistStats::default());
        let (worker, persist) = PersistWorker::new(
            storage,
            config.storage_key.clone(),
            config.persist_mode,
            stats.clone(),
        );
        tokio::spawn(worker.run());

        CartStore {
            inner: Arc::new(Inner {
                slot: Mutex::new(CartSlot { cart, revision: 0 }),
                persist,
                stats,
                storage_key: config.storage_key.clone(),
            }),
        }
    }

    /// Returns a copy of the current items, in cart order.
    pub fn products(&self) -> Vec<LineItem> {
        self.lock().cart.items().to_vec()
    }

    /// Returns a copy of the whole cart.
    pub fn snapshot(&self) -> Cart {
        self.lock().cart.clone()
    }

    /// Returns item and unit counts.
    pub fn totals(&self) -> CartTotals {
        self.lock().cart.totals()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.lock().cart.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().cart.is_empty()
    }

    /// Adds a product, or increments it if already in the cart.
    ///
    /// The product is copied; the caller keeps its value unchanged.
    pub fn add_to_cart(&self, product: &Product) {
        debug!(product_id = %product.id, "add_to_cart");
        self.mutate("add_to_cart", |cart| cart.add_to_cart(product));
    }

    /// Increases the item's quantity by one. Unknown ids are ignored.
    pub fn increment(&self, id: &str) {
        debug!(product_id = %id, "increment");
        self.mutate("increment", |cart| cart.increment(id));
    }

    /// Decreases the item's quantity by one, removing it at zero.
    /// Unknown ids are ignored.
    pub fn decrement(&self, id: &str) {
        debug!(product_id = %id, "decrement");
        self.mutate("decrement", |cart| cart.decrement(id));
    }

    /// Waits until every change made so far has been written (or has
    /// failed and been logged).
    pub async fn flush(&self) -> StoreResult<()> {
        self.inner.persist.flush().await
    }

    /// Persist counters for diagnostics.
    pub fn persist_stats(&self) -> &PersistStats {
        &self.inner.stats
    }

    /// The storage key this store writes.
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    fn lock(&self) -> MutexGuard<'_, CartSlot> {
        // A panic mid-mutation leaves a valid Cart behind; keep serving it
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<F>(&self, operation: &'static str, apply: F)
    where
        F: FnOnce(&mut Cart) -> bool,
    {
        let mut slot = self.lock();

        if !apply(&mut slot.cart) {
            debug!(operation, "Cart unchanged, nothing to persist");
            return;
        }

        slot.revision += 1;
        let revision = slot.revision;

        match slot.cart.to_json() {
            Ok(payload) => {
                if !self.inner.persist.enqueue(Snapshot { revision, payload }) {
                    warn!(operation, revision, "Persist worker stopped; change kept in memory only");
                }
            }
            Err(e) => {
                error!(operation, revision, error = %e, "Failed to encode cart for persistence");
            }
        }
    }
}

/// Reads the stored cart, falling back to empty on any problem.
async fn load_cart(storage: &dyn KeyValueStorage, key: &str) -> Cart {
    match storage.get_item(key).await {
        Ok(Some(raw)) => match Cart::from_json(&raw) {
            Ok(cart) => {
                info!(key = %key, items = cart.len(), "Loaded persisted cart");
                cart
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Stored cart is malformed, starting empty");
                Cart::new()
            }
        },
        Ok(None) => {
            debug!(key = %key, "No persisted cart, starting empty");
            Cart::new()
        }
        Err(e) => {
            error!(key = %key, error = %e, "Failed to read persisted cart, starting empty");
            Cart::new()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::StoreError;
    use crate::storage::{MemoryStorage, SqliteStorage, StorageConfig};

    /// Storage whose reads and writes always fail.
    struct BrokenStorage;

    #[async_trait]
    impl KeyValueStorage for BrokenStorage {
        async fn get_item(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::ConnectionFailed("disk unplugged".to_string()))
        }

        async fn set_item(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::ConnectionFailed("disk unplugged".to_string()))
        }
    }

    fn immediate() -> CartStoreConfig {
        CartStoreConfig::default().persist_mode(PersistMode::Immediate)
    }

    fn product(id: &str) -> Product {
        Product::new(id, "T", "u", 10.0)
    }

    async fn stored_cart(storage: &MemoryStorage) -> Option<Cart> {
        storage
            .get_item(CART_STORAGE_KEY)
            .await
            .unwrap()
            .map(|raw| Cart::from_json(&raw).unwrap())
    }

    #[tokio::test]
    async fn test_opens_empty_without_stored_cart() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), &immediate()).await;

        assert!(store.is_empty());
        store.flush().await.unwrap();

        // Loading an empty cart writes nothing
        assert_eq!(store.persist_stats().writes(), 0);
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_loading_does_not_persist() {
        let raw = r#"[{"id":"a","title":"T","image_url":"u","price":10,"quantity":2}]"#;
        let storage = Arc::new(MemoryStorage::with_item(CART_STORAGE_KEY, raw));

        let store = CartStore::open(storage.clone(), &immediate()).await;
        store.flush().await.unwrap();

        assert_eq!(store.products()[0].quantity, 2);
        assert_eq!(store.persist_stats().writes(), 0);
        assert_eq!(
            storage.get_item(CART_STORAGE_KEY).await.unwrap().as_deref(),
            Some(raw)
        );
    }

    #[tokio::test]
    async fn test_huge_stored_quantity_does_not_overflow() {
        let raw = r#"[{"id":"a","title":"T","image_url":"u","price":10,"quantity":9223372036854775807},{"id":"b","title":"T","image_url":"u","price":10,"quantity":1}]"#;
        let storage = Arc::new(MemoryStorage::with_item(CART_STORAGE_KEY, raw));

        let store = CartStore::open(storage.clone(), &immediate()).await;
        assert_eq!(store.totals().total_quantity, i64::MAX);

        store.increment("a");
        store.flush().await.unwrap();

        assert_eq!(store.products()[0].quantity, i64::MAX);
        let stored = stored_cart(&storage).await.unwrap();
        assert_eq!(stored.get("a").unwrap().quantity, i64::MAX);
        assert_eq!(stored.get("b").unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_malformed_stored_cart_loads_empty() {
        let storage = Arc::new(MemoryStorage::with_item(CART_STORAGE_KEY, "{oops"));

        let store = CartStore::open(storage, &immediate()).await;

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_to_empty_cart_persists_single_item() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), &immediate()).await;

        store.add_to_cart(&Product::new("a", "T", "u", 10.0));
        store.flush().await.unwrap();

        let expected = vec![LineItem {
            id: "a".to_string(),
            title: "T".to_string(),
            image_url: "u".to_string(),
            price: 10.0,
            quantity: 1,
        }];
        assert_eq!(store.products(), expected);
        assert_eq!(stored_cart(&storage).await.unwrap().into_items(), expected);
    }

    #[tokio::test]
    async fn test_scenarios_through_the_store() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), &immediate()).await;

        store.add_to_cart(&product("a"));
        store.add_to_cart(&product("a"));
        store.add_to_cart(&product("b"));
        store.increment("a");

        let quantities: Vec<_> = store
            .products()
            .into_iter()
            .map(|i| (i.id, i.quantity))
            .collect();
        assert_eq!(
            quantities,
            vec![("a".to_string(), 3), ("b".to_string(), 1)]
        );

        store.decrement("b");
        store.decrement("a");
        store.flush().await.unwrap();

        assert_eq!(store.totals().item_count, 1);
        assert_eq!(store.totals().total_quantity, 2);
        assert_eq!(stored_cart(&storage).await.unwrap(), store.snapshot());
        assert_eq!(store.persist_stats().writes(), 6);
    }

    #[tokio::test]
    async fn test_noop_mutations_do_not_persist() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), &immediate()).await;

        store.increment("missing");
        store.decrement("missing");
        store.flush().await.unwrap();

        assert_eq!(store.persist_stats().writes(), 0);
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_products_is_a_copy() {
        let store = CartStore::open(Arc::new(MemoryStorage::new()), &immediate()).await;
        store.add_to_cart(&product("a"));

        let mut view = store.products();
        view[0].quantity = 99;
        view.clear();

        assert_eq!(store.products()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_cart_usable() {
        let store = CartStore::open(Arc::new(BrokenStorage), &immediate()).await;

        store.add_to_cart(&product("a"));
        store.increment("a");
        store.flush().await.unwrap();

        assert_eq!(store.products()[0].quantity, 2);
        assert_eq!(store.persist_stats().failures(), 2);
        assert_eq!(store.persist_stats().writes(), 0);
    }

    #[tokio::test]
    async fn test_coalesced_store_persists_final_state() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), &CartStoreConfig::default()).await;

        for _ in 0..50 {
            store.add_to_cart(&product("a"));
        }
        store.decrement("a");
        store.flush().await.unwrap();

        let stored = stored_cart(&storage).await.unwrap();
        assert_eq!(stored.get("a").map(|i| i.quantity), Some(49));
        let stats = store.persist_stats();
        assert_eq!(stats.writes() + stats.coalesced(), 51);
    }

    #[tokio::test]
    async fn test_concurrent_handles_persist_last_state() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), &immediate()).await;

        let mut tasks = Vec::new();
        for n in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let id = format!("p{}", n % 2);
                for _ in 0..25 {
                    store.add_to_cart(&product(&id));
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        store.flush().await.unwrap();

        assert_eq!(store.totals().total_quantity, 200);
        assert_eq!(stored_cart(&storage).await.unwrap(), store.snapshot());
    }

    #[tokio::test]
    async fn test_restart_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gomarket.db");

        let storage = Arc::new(SqliteStorage::open(StorageConfig::new(&path)).await.unwrap());
        let store = CartStore::open(storage.clone(), &CartStoreConfig::default()).await;
        store.add_to_cart(&Product::new("b", "Banana", "https://img/b.png", 1.25));
        store.add_to_cart(&Product::new("a", "Apple", "https://img/a.png", 2.5));
        store.increment("b");
        store.flush().await.unwrap();
        let before = store.products();
        drop(store);
        storage.close().await;

        // App restart
        let storage = Arc::new(SqliteStorage::open(StorageConfig::new(&path)).await.unwrap());
        let restarted = CartStore::open(storage, &CartStoreConfig::default()).await;

        assert_eq!(restarted.products(), before);
        assert_eq!(restarted.products()[0].id, "b");
        assert_eq!(restarted.products()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let storage = Arc::new(MemoryStorage::new());
        let config = immediate().storage_key("@Test:cart");
        let store = CartStore::open(storage.clone(), &config).await;

        store.add_to_cart(&product("a"));
        store.flush().await.unwrap();

        assert_eq!(store.storage_key(), "@Test:cart");
        assert!(storage.get_item("@Test:cart").await.unwrap().is_some());
        assert!(storage.get_item(CART_STORAGE_KEY).await.unwrap().is_none());
    }
}
