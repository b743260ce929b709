//! Cart state engine for Cart Keeper.
//!
//! Holds the canonical cart snapshot in memory, applies add / increment /
//! decrement with merge-on-add and quantity-floor semantics, and keeps a
//! persisted copy in a [`KeyValueStore`] in step with every change.
//!
//! # Design Rules
//!
//! 1. A store exists only after its persisted snapshot has been loaded.
//! 2. Mutations are serialized; each reads the latest committed state.
//! 3. Mutations return once memory is updated; persistence runs behind them.
//! 4. Persistence writes follow mutation order, so storage never regresses.
//! 5. Unknown ids are no-ops, never errors.
//!
//! # Modules
//!
//! - [`store`] — [`CartStore`], the state and persistence engine
//! - [`scope`] — [`CartScope`] access guard and the [`CartHandle`] bundle
//! - [`config`] — [`CartConfig`] and the corrupt-snapshot policy
//! - [`error`] — [`CartError`]

pub mod config;
pub mod error;
pub mod scope;
pub mod store;

#[cfg(test)]
mod test_support;

pub use config::{CartConfig, CorruptSnapshotPolicy, DEFAULT_STORAGE_KEY};
pub use error::{CartError, CartResult};
pub use scope::{CartHandle, CartScope};
pub use store::{CartStore, MutationOutcome, PersistFailure, PersistStatus};

// Re-export the types consumers need alongside the store.
pub use cart_storage::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, StorageError};
pub use cart_types::{CartItem, CartMutation, CartSnapshot, ProductDescriptor};
