//! # Persist Worker
//!
//! Single writer that mirrors cart snapshots into key-value storage.
//!
//! ## Persist Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Persist Worker Flow                               │
//! │                                                                         │
//! │  CartStore mutation (cart lock held)                                   │
//! │       │                                                                 │
//! │       │  PersistHandle::enqueue(Snapshot { revision, payload })         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  unbounded mpsc queue   (order == mutation order)               │   │
//! │  │  [rev 4] [rev 5] [flush] [rev 6]                                │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  PersistWorker::run (one task per store)                        │   │
//! │  │                                                                 │   │
//! │  │  1. Receive next command                                       │   │
//! │  │  2. Coalesced mode: skip snapshots superseded by newer queued  │   │
//! │  │     ones (stops at a flush marker)                              │   │
//! │  │  3. storage.set_item(key, payload)                             │   │
//! │  │     • Ok  → writes += 1                                        │   │
//! │  │     • Err → error!(..), failures += 1, keep going              │   │
//! │  │  4. Flush marker → ack the waiting caller                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Only this task ever writes the key, so a slow earlier write can       │
//! │  never land after a later one.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::error::{StoreError, StoreResult};
use crate::storage::KeyValueStorage;

// =============================================================================
// Persist Mode
// =============================================================================

/// How queued snapshots are written.
///
/// ## Mode Comparison
/// ```text
/// IMMEDIATE                           │  COALESCED (Default)
/// ──────────                          │  ─────────────────────
/// • Every snapshot is written         │  • Backlog collapses to newest
/// • One write per mutation            │  • Fewer writes under bursts
///                                     │  • Same final stored value
///
/// Example: three taps on "+" while a write is in flight
///
/// IMMEDIATE: write rev 2, rev 3, rev 4 │  COALESCED: write rev 4
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// Write every snapshot in order.
    Immediate,

    /// Write only the newest of the snapshots already queued.
    #[default]
    Coalesced,
}

impl std::fmt::Display for PersistMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistMode::Immediate => write!(f, "immediate"),
            PersistMode::Coalesced => write!(f, "coalesced"),
        }
    }
}

impl std::str::FromStr for PersistMode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immediate" => Ok(PersistMode::Immediate),
            "coalesced" => Ok(PersistMode::Coalesced),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown persist mode: '{}'. Valid options: immediate, coalesced",
                other
            ))),
        }
    }
}

// =============================================================================
// Messages & Stats
// =============================================================================

/// A serialized cart at a given revision.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Store-local mutation counter.
    pub revision: u64,

    /// Encoded cart.
    pub payload: String,
}

enum PersistCommand {
    Write(Snapshot),
    Flush(oneshot::Sender<()>),
}

/// Counters shared between the worker and the store.
#[derive(Debug, Default)]
pub struct PersistStats {
    writes: AtomicU64,
    failures: AtomicU64,
    coalesced: AtomicU64,
}

impl PersistStats {
    /// Successful writes.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Failed writes (logged and skipped).
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Snapshots skipped because a newer one was queued behind them.
    pub fn coalesced(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Sending side of the persist queue.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl std::fmt::Debug for PersistCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistCommand::Write(snapshot) => write!(f, "Write(rev {})", snapshot.revision),
            PersistCommand::Flush(_) => write!(f, "Flush"),
        }
    }
}

impl PersistHandle {
    /// Queues a snapshot. Never blocks.
    ///
    /// Returns `false` if the worker is gone; the snapshot is dropped.
    pub fn enqueue(&self, snapshot: Snapshot) -> bool {
        self.tx.send(PersistCommand::Write(snapshot)).is_ok()
    }

    /// Waits until every snapshot queued before this call has been handled.
    pub async fn flush(&self) -> StoreResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();

        self.tx
            .send(PersistCommand::Flush(ack_tx))
            .map_err(|_| StoreError::PersistWorkerStopped)?;

        ack_rx.await.map_err(|_| StoreError::PersistWorkerStopped)
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Background task owning all writes to one storage key.
pub struct PersistWorker {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    mode: PersistMode,
    rx: mpsc::UnboundedReceiver<PersistCommand>,
    stats: Arc<PersistStats>,
}

impl PersistWorker {
    /// Creates a worker and the handle that feeds it.
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        key: impl Into<String>,
        mode: PersistMode,
        stats: Arc<PersistStats>,
    ) -> (Self, PersistHandle) {
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = PersistWorker {
            storage,
            key: key.into(),
            mode,
            rx,
            stats,
        };

        (worker, PersistHandle { tx })
    }

    /// Runs until every handle is dropped and the queue is drained.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(key = %self.key, mode = %self.mode, "Persist worker starting");

        while let Some(command) = self.rx.recv().await {
            match command {
                PersistCommand::Write(snapshot) => {
                    let (latest, deferred) = match self.mode {
                        PersistMode::Immediate => (snapshot, None),
                        PersistMode::Coalesced => self.coalesce(snapshot),
                    };

                    self.write(latest).await;

                    if let Some(PersistCommand::Flush(ack)) = deferred {
                        let _ = ack.send(());
                    }
                }
                PersistCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }

        info!(
            key = %self.key,
            writes = self.stats.writes(),
            failures = self.stats.failures(),
            "Persist worker stopped"
        );
    }

    /// Drains already-queued snapshots, keeping the newest.
    ///
    /// Stops at the first flush marker and hands it back so it is acked
    /// only after the write it follows.
    fn coalesce(&mut self, mut latest: Snapshot) -> (Snapshot, Option<PersistCommand>) {
        while let Ok(next) = self.rx.try_recv() {
            match next {
                PersistCommand::Write(newer) => {
                    debug!(
                        skipped = latest.revision,
                        newer = newer.revision,
                        "Coalescing cart snapshot"
                    );
                    self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                    latest = newer;
                }
                flush @ PersistCommand::Flush(_) => return (latest, Some(flush)),
            }
        }

        (latest, None)
    }

    async fn write(&self, snapshot: Snapshot) {
        match self.storage.set_item(&self.key, &snapshot.payload).await {
            Ok(()) => {
                self.stats.writes.fetch_add(1, Ordering::Relaxed);
                debug!(
                    key = %self.key,
                    revision = snapshot.revision,
                    "Cart persisted"
                );
            }
            Err(e) => {
                // The in-memory cart stays authoritative for this session
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    key = %self.key,
                    revision = snapshot.revision,
                    error = %e,
                    "Failed to persist cart"
                );
            }
        }
    }
}
