//! # Store Configuration
//!
//! Where the cart is stored and how it is written.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_DB_PATH=/data/gomarket.db                                 │
//! │     GOMARKET_CART_KEY=@GoMarketplace:products                          │
//! │     GOMARKET_PERSIST_MODE=immediate                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket/config.toml (Linux)                             │
//! │     ~/Library/Application Support/com.gomarket.marketplace/config.toml │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     platform data dir/gomarket.db, coalesced persists                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! path = "/var/lib/gomarket/gomarket.db"
//! max_connections = 5
//!
//! [cart]
//! key = "@GoMarketplace:products"
//! persist_mode = "coalesced"  # immediate | coalesced
//! ```

use std::path::PathBuf;

use gomarket_core::CART_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cart_store::CartStoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::persist::PersistMode;
use crate::storage::StorageConfig;

/// Database file name used under the platform data directory.
const DATABASE_FILE: &str = "gomarket.db";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the key-value database lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Database file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

/// Which key holds the cart and how writes are scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSettings {
    /// Storage key of the cart blob.
    #[serde(default = "default_cart_key")]
    pub key: String,

    /// Persist scheduling.
    #[serde(default)]
    pub persist_mode: PersistMode,
}

fn default_cart_key() -> String {
    CART_STORAGE_KEY.to_string()
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            key: default_cart_key(),
            persist_mode: PersistMode::default(),
        }
    }
}

// =============================================================================
// Main Store Configuration
// =============================================================================

/// Complete store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub cart: CartSettings,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, or the platform config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        Self::load_from(config_path, |name| std::env::var(name).ok())
    }

    /// [`StoreConfig::load`] with an explicit variable lookup in place of
    /// the process environment.
    pub fn load_from<F>(config_path: Option<PathBuf>, lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides_from(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Store config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.cart.key.trim().is_empty() {
            return Err(StoreError::InvalidConfig("cart key must not be empty".into()));
        }

        if self.storage.max_connections == 0 {
            return Err(StoreError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `GOMARKET_*` overrides from a variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("GOMARKET_CART_KEY") {
            debug!(key = %key, "Overriding cart key from environment");
            self.cart.key = key;
        }

        if let Some(mode) = lookup("GOMARKET_PERSIST_MODE") {
            match mode.parse() {
                Ok(parsed) => self.cart.persist_mode = parsed,
                Err(_) => warn!(mode = %mode, "Unknown persist mode in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gomarket", "marketplace")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Returns the database path: configured, else the platform data dir,
    /// else the working directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "gomarket", "marketplace")
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
    }

    /// SQLite storage settings derived from this config.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(self.database_path()).max_connections(self.storage.max_connections)
    }

    /// Cart store settings derived from this config.
    pub fn cart_store_config(&self) -> CartStoreConfig {
        CartStoreConfig::default()
            .storage_key(self.cart.key.clone())
            .persist_mode(self.cart.persist_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.cart.key, "@GoMarketplace:products");
        assert_eq!(config.cart.persist_mode, PersistMode::Coalesced);
        assert_eq!(config.storage.max_connections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();

        config.cart.key = "  ".to_string();
        assert!(config.validate().is_err());

        config.cart.key = "@Test:cart".to_string();
        config.storage.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GOMARKET_DB_PATH", "/tmp/cart.db"),
            ("GOMARKET_CART_KEY", "@Test:cart"),
            ("GOMARKET_PERSIST_MODE", "immediate"),
        ]
        .into_iter()
        .collect();

        let mut config = StoreConfig::default();
        config.apply_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.database_path(), PathBuf::from("/tmp/cart.db"));
        assert_eq!(config.cart_store_config().storage_key, "@Test:cart");
        assert_eq!(config.cart_store_config().persist_mode, PersistMode::Immediate);
    }

    #[test]
    fn test_unknown_persist_mode_override_is_ignored() {
        let mut config = StoreConfig::default();
        config.apply_overrides_from(|name| {
            (name == "GOMARKET_PERSIST_MODE").then(|| "sometimes".to_string())
        });
        assert_eq!(config.cart.persist_mode, PersistMode::Coalesced);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            [cart]
            persist_mode = "immediate"
            "#,
        )
        .unwrap();

        assert_eq!(config.cart.persist_mode, PersistMode::Immediate);
        assert_eq!(config.cart.key, CART_STORAGE_KEY);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = StoreConfig::default();
        config.storage.path = Some(dir.path().join("cart.db"));
        config.cart.key = "@Saved:cart".to_string();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[cart]"));

        let loaded: StoreConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.cart.key, "@Saved:cart");
        assert_eq!(loaded.storage.path, Some(dir.path().join("cart.db")));
    }

    #[test]
    fn test_load_file_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [storage]
            path = "/from/file.db"
            max_connections = 3

            [cart]
            key = "@File:cart"
            persist_mode = "immediate"
            "#,
        )
        .unwrap();

        let from_file = StoreConfig::load_from(Some(path.clone()), |_| None).unwrap();
        assert_eq!(from_file.database_path(), PathBuf::from("/from/file.db"));
        assert_eq!(from_file.storage.max_connections, 3);
        assert_eq!(from_file.cart.key, "@File:cart");
        assert_eq!(from_file.cart.persist_mode, PersistMode::Immediate);

        let vars: HashMap<&str, &str> = [
            ("GOMARKET_DB_PATH", "/from/env.db"),
            ("GOMARKET_PERSIST_MODE", "coalesced"),
        ]
        .into_iter()
        .collect();
        let layered =
            StoreConfig::load_from(Some(path), |name| vars.get(name).map(|v| v.to_string()))
                .unwrap();

        assert_eq!(layered.database_path(), PathBuf::from("/from/env.db"));
        assert_eq!(layered.cart.persist_mode, PersistMode::Coalesced);
        // Values without an override still come from the file
        assert_eq!(layered.cart.key, "@File:cart");
        assert_eq!(layered.storage.max_connections, 3);
    }

    #[test]
    fn test_load_validates_after_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cart]\nkey = \"@File:cart\"\n").unwrap();

        let result = StoreConfig::load_from(Some(path), |name| {
            (name == "GOMARKET_CART_KEY").then(|| " ".to_string())
        });
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_rejects_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cart\nkey = ").unwrap();

        assert!(matches!(
            StoreConfig::load(Some(path)),
            Err(StoreError::ConfigLoadFailed(_))
        ));
    }

    #[test]
    fn test_storage_config_uses_settings() {
        let mut config = StoreConfig::default();
        config.storage.path = Some(PathBuf::from("/tmp/x.db"));
        config.storage.max_connections = 2;

        let storage = config.storage_config();
        assert_eq!(storage.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(storage.max_connections, 2);
    }
}
