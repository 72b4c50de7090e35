//! # Config Commands
//!
//! Reports the configuration the cart commands would run with.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use gomarket_store::{PersistMode, StoreConfig};

/// Effective configuration after file, environment and flag overrides.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub cart_key: String,
    pub persist_mode: PersistMode,
}

/// Gets the effective configuration.
///
/// ## When Used
/// - Checking which database file a cart lives in
/// - Verifying `GOMARKET_*` overrides took effect
pub fn get_config(config: &StoreConfig) -> ConfigResponse {
    debug!("get_config command");
    ConfigResponse {
        database_path: config.database_path(),
        max_connections: config.storage.max_connections,
        cart_key: config.cart.key.clone(),
        persist_mode: config.cart.persist_mode,
    }
}
