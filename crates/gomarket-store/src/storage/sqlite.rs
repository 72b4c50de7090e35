//! # SQLite Storage
//!
//! Key-value storage on a single SQLite table, the device-local default.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Key-Value Storage                           │
//! │                                                                         │
//! │  StorageConfig::new(path) ← Configure pool settings                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStorage::open(config).await ← Create pool + run migrations      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────┐          │
//! │  │ key_value_store                                          │          │
//! │  │ key (PK)                 │ value        │ updated_at     │          │
//! │  │ ─────────────────────────┼──────────────┼─────────────── │          │
//! │  │ @GoMarketplace:products  │ [{"id":...}] │ 2026-10-19T... │          │
//! │  └──────────────────────────────────────────────────────────┘          │
//! │                                                                         │
//! │  get_item → SELECT value ... WHERE key = ?                             │
//! │  set_item → INSERT ... ON CONFLICT(key) DO UPDATE (upsert)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases use WAL so the startup read never waits on a persist.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::KeyValueStorage;
use crate::error::{StoreError, StoreResult};
use crate::migrations;

/// Path value that selects a private in-memory database.
const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the key-value table lives and how its pool is sized.
///
/// Only two things ever touch the table: the startup load and the persist
/// worker. A handful of connections is plenty.
///
/// ## Example
/// ```rust,ignore
/// let config = StorageConfig::new("/path/to/gomarket.db")
///     .max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Database file, or `:memory:` for a store that dies with the process.
    pub database_path: PathBuf,

    /// Pool size shared by loads and persists.
    pub max_connections: u32,

    /// How long a get or set waits for a free connection before failing.
    pub acquire_timeout: Duration,

    /// Create `key_value_store` on open if it does not exist yet.
    pub run_migrations: bool,
}

impl StorageConfig {
    /// Creates a configuration for the database file at `path`.
    ///
    /// The file (and its parent directory) is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StorageConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    /// Sets the pool size.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets whether the table is created on open.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The database lives on the pool's single connection and disappears
    /// with the storage.
    pub fn in_memory() -> Self {
        StorageConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            // Each connection would see its own empty database
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Checks whether this configuration selects an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }
}

// =============================================================================
// Storage
// =============================================================================

/// SQLite-backed [`KeyValueStorage`].
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database and applies migrations.
    ///
    /// ## What This Does
    /// 1. Creates the parent directory and database file if missing
    /// 2. Configures SQLite: WAL journal, NORMAL synchronous
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn open(config: StorageConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening key-value storage"
        );

        let in_memory = config.is_in_memory();

        let connect_options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
        } else {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            SqliteConnectOptions::new()
                .filename(&config.database_path)
                // Readers don't block the persist writer and vice versa
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };
        let connect_options = connect_options.create_if_missing(true);

        debug!(in_memory, "Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        if in_memory {
            // Recycling the only connection would drop the database
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Storage pool created"
        );

        let storage = SqliteStorage { pool };

        if config.run_migrations {
            storage.run_migrations().await?;
        }

        Ok(storage)
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        info!("Running storage migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns when `key` was last written, as stored (RFC 3339, UTC).
    pub async fn updated_at(&self, key: &str) -> StoreResult<Option<String>> {
        let stamp = sqlx::query_scalar::<_, String>(
            "SELECT updated_at FROM key_value_store WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stamp)
    }

    /// Closes the connection pool.
    ///
    /// After calling close, all storage operations will fail.
    pub async fn close(&self) {
        info!("Closing storage connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is responsive.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl KeyValueStorage for SqliteStorage {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let value =
            sqlx::query_scalar::<_, String>("SELECT value FROM key_value_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = value.is_some(), "get_item");
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "set_item");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
