//! # gomarket CLI Library
//!
//! Everything behind the `gomarket` binary, kept in a library so commands
//! can be driven from tests.
//!
//! ## Module Organization
//! ```text
//! gomarket_cli/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── commands/
//! │   ├── mod.rs      ◄─── Dispatch
//! │   ├── cart.rs     ◄─── show / add / increment / decrement
//! │   └── config.rs   ◄─── Effective configuration
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## One Invocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       gomarket increment sku-1                          │
//! │                                                                         │
//! │  1. Load Config ──────────────────────────────────────────────────────► │
//! │     • config.toml, then GOMARKET_* env, then --db                       │
//! │                                                                         │
//! │  2. Open Storage ─────────────────────────────────────────────────────► │
//! │     • SQLite with WAL mode, pending migrations applied                  │
//! │                                                                         │
//! │  3. Provide the Cart ─────────────────────────────────────────────────► │
//! │     • CartStore::open loads "@GoMarketplace:products" (no write)        │
//! │     • CartContext::provide(store)                                       │
//! │                                                                         │
//! │  4. Run the Command ──────────────────────────────────────────────────► │
//! │     • ctx.use_cart()?.increment("sku-1")                                │
//! │                                                                         │
//! │  5. Flush & Close ────────────────────────────────────────────────────► │
//! │     • Wait for the persist worker, then close the pool                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gomarket_store::{CartContext, CartStore, SqliteStorage, StoreConfig};

pub use cli::{Cli, Command};
pub use error::{ApiError, ErrorCode};

/// Runs one command and returns the JSON to print on stdout.
///
/// Persist failures do not fail the command: the cart change already
/// happened in memory, so they are logged and counted instead.
pub async fn run(cli: Cli) -> Result<String, ApiError> {
    let mut config = StoreConfig::load(cli.config.clone())?;
    if let Some(db) = &cli.db {
        config.storage.path = Some(db.clone());
    }

    if let Command::Config = cli.command {
        return render(&commands::config::get_config(&config), cli.pretty);
    }

    let storage = Arc::new(SqliteStorage::open(config.storage_config()).await?);
    info!(path = ?config.database_path(), "Cart storage opened");

    let store = CartStore::open(storage.clone(), &config.cart_store_config()).await;
    let ctx = CartContext::provide(store.clone());

    let result = commands::execute(&ctx, &cli.command);

    if let Err(e) = store.flush().await {
        warn!("Persist queue did not drain: {}", e);
    }

    let stats = store.persist_stats();
    if stats.failures() > 0 {
        warn!(
            failures = stats.failures(),
            "Cart changes could not be saved; they were kept for this run only"
        );
    }
    debug!(
        writes = stats.writes(),
        coalesced = stats.coalesced(),
        "Persist summary"
    );

    storage.close().await;

    render(&result?, cli.pretty)
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String, ApiError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };

    rendered.map_err(|e| ApiError::internal(format!("Failed to render output: {}", e)))
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout stays pure JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gomarket_store=trace` - Trace the store and persist worker
/// - Default: WARN, INFO for gomarket crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,gomarket_cli=info,gomarket_store=info,gomarket_core=info,sqlx=warn")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
