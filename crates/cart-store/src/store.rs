//! The cart state engine.
//!
//! [`CartStore`] owns the canonical [`CartSnapshot`]. Mutations are applied
//! under a single mutex so each one reads the latest committed state, and
//! every change is handed to a background writer task in sequence order.
//!
//! ```text
//! add_to_cart / increment / decrement
//!        │ lock, apply, seq += 1
//!        ├──▶ watch: committed snapshot (subscribe)
//!        └──▶ mpsc: PersistRequest { seq, snapshot }
//!                    │
//!              writer task ── KeyValueStore::set ──▶ watch: PersistStatus (flush)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cart_storage::KeyValueStore;
use cart_types::{CartMutation, CartSnapshot, ProductDescriptor};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::{CartConfig, CorruptSnapshotPolicy};
use crate::error::{CartError, CartResult};

/// Result of a mutation call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The snapshot changed; `seq` is the mutation's sequence number.
    Applied { seq: u64 },
    /// Nothing matched; the snapshot and storage are untouched.
    Unchanged,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// A persistence write that did not succeed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistFailure {
    pub seq: u64,
    pub reason: String,
}

/// Progress of the persistence writer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistStatus {
    /// Highest sequence whose write has completed, successfully or not.
    /// Sequence 0 is the state loaded at startup.
    pub settled: u64,
    /// Set when the write that settled `settled` failed.
    pub failure: Option<PersistFailure>,
}

struct PersistRequest {
    seq: u64,
    snapshot: CartSnapshot,
}

struct CartState {
    snapshot: CartSnapshot,
    seq: u64,
}

/// Stateful cart service: in-memory snapshot plus ordered persistence.
///
/// Obtained only through [`CartStore::initialize`], so a store is never
/// observable before its persisted snapshot has been loaded.
pub struct CartStore {
    state: Mutex<CartState>,
    key: String,
    writes: mpsc::UnboundedSender<PersistRequest>,
    changes: watch::Sender<CartSnapshot>,
    persisted: watch::Receiver<PersistStatus>,
}

impl CartStore {
    /// Load the persisted snapshot and start the persistence writer.
    ///
    /// An absent or blank value yields an empty cart. A present value is
    /// decoded as-is without validating its contents. Must be called from
    /// within a tokio runtime.
    pub async fn initialize(
        storage: Arc<dyn KeyValueStore>,
        config: &CartConfig,
    ) -> CartResult<Self> {
        config.validate()?;
        let key = config.storage_key.clone();
        let snapshot = load_snapshot(storage.as_ref(), &key, config.on_corrupt).await?;
        info!(key = %key, items = snapshot.len(), "cart loaded");

        let (writes, queue) = mpsc::unbounded_channel();
        let (status_tx, persisted) = watch::channel(PersistStatus::default());
        let (changes, _) = watch::channel(snapshot.clone());
        tokio::spawn(run_writer(storage, key.clone(), queue, status_tx));

        Ok(Self {
            state: Mutex::new(CartState { snapshot, seq: 0 }),
            key,
            writes,
            changes,
            persisted,
        })
    }

    /// Add one unit of `product`, merging with an existing line of the same id.
    pub fn add_to_cart(&self, product: ProductDescriptor) -> MutationOutcome {
        self.apply(CartMutation::Add(product))
    }

    /// Raise the quantity of line `id` by one.
    pub fn increment(&self, id: &str) -> MutationOutcome {
        self.apply(CartMutation::Increment { id: id.to_string() })
    }

    /// Lower the quantity of line `id` by one, removing it at zero.
    pub fn decrement(&self, id: &str) -> MutationOutcome {
        self.apply(CartMutation::Decrement { id: id.to_string() })
    }

    /// Apply a mutation and queue the resulting snapshot for persistence.
    ///
    /// Returns as soon as the in-memory snapshot is updated; the write
    /// happens in the background. Write failures are logged, not returned.
    pub fn apply(&self, mutation: CartMutation) -> MutationOutcome {
        let mut state = self.lock_state();
        if !state.snapshot.apply(&mutation) {
            debug!(op = mutation.op(), id = mutation.target(), "no matching line; cart unchanged");
            return MutationOutcome::Unchanged;
        }
        state.seq += 1;
        let seq = state.seq;

        self.changes.send_replace(state.snapshot.clone());
        // Enqueued under the lock so queue order matches sequence order.
        let request = PersistRequest {
            seq,
            snapshot: state.snapshot.clone(),
        };
        if self.writes.send(request).is_err() {
            warn!(seq, "persistence writer stopped; change kept in memory only");
        }
        debug!(op = mutation.op(), id = mutation.target(), seq, lines = state.snapshot.len(), "cart mutated");
        MutationOutcome::Applied { seq }
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> CartSnapshot {
        self.lock_state().snapshot.clone()
    }

    /// Sequence number of the latest committed mutation.
    pub fn sequence(&self) -> u64 {
        self.lock_state().seq
    }

    /// Observe every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.changes.subscribe()
    }

    /// Latest persistence progress.
    pub fn persist_status(&self) -> PersistStatus {
        self.persisted.borrow().clone()
    }

    /// Wait until every mutation committed before this call is persisted.
    ///
    /// Returns [`CartError::Persist`] if the write that covered those
    /// mutations failed. A later successful write clears the failure.
    pub async fn flush(&self) -> CartResult<()> {
        let target = self.sequence();
        let mut persisted = self.persisted.clone();
        let status = persisted
            .wait_for(|status| status.settled >= target)
            .await
            .map(|status| status.clone())
            .map_err(|_| CartError::Persist {
                seq: target,
                reason: "persistence writer stopped".into(),
            })?;

        match status.failure {
            Some(failure) => Err(CartError::Persist {
                seq: failure.seq,
                reason: failure.reason,
            }),
            None => Ok(()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CartState> {
        // Every mutation leaves the snapshot valid before it can panic.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("lines", &state.snapshot.len())
            .field("seq", &state.seq)
            .finish()
    }
}

async fn load_snapshot(
    storage: &dyn KeyValueStore,
    key: &str,
    on_corrupt: CorruptSnapshotPolicy,
) -> CartResult<CartSnapshot> {
    let Some(raw) = storage.get(key).await? else {
        return Ok(CartSnapshot::new());
    };
    if raw.trim().is_empty() {
        return Ok(CartSnapshot::new());
    }
    match CartSnapshot::decode(&raw) {
        Ok(snapshot) => Ok(snapshot),
        Err(e) => match on_corrupt {
            CorruptSnapshotPolicy::Fail => Err(CartError::CorruptSnapshot {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            CorruptSnapshotPolicy::Reset => {
                warn!(key, error = %e, "corrupt cart snapshot; starting empty");
                Ok(CartSnapshot::new())
            }
        },
    }
}

/// Drain persistence requests in order, writing only the newest of any
/// backlog. Exits once the store is dropped and the queue is empty.
async fn run_writer(
    storage: Arc<dyn KeyValueStore>,
    key: String,
    mut queue: mpsc::UnboundedReceiver<PersistRequest>,
    status: watch::Sender<PersistStatus>,
) {
    while let Some(mut request) = queue.recv().await {
        while let Ok(newer) = queue.try_recv() {
            request = newer;
        }

        let result = match request.snapshot.encode() {
            Ok(payload) => storage.set(&key, &payload).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let failure = match result {
            Ok(()) => {
                debug!(key = %key, seq = request.seq, "cart persisted");
                None
            }
            Err(reason) => {
                warn!(key = %key, seq = request.seq, error = %reason, "failed to persist cart");
                Some(PersistFailure {
                    seq: request.seq,
                    reason,
                })
            }
        };
        status.send_replace(PersistStatus {
            settled: request.seq,
            failure,
        });
    }
    debug!(key = %key, "persistence writer stopped");
}
