use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

/// Asynchronous string key-value store.
///
/// The cart treats its backend as opaque: values are whole serialized
/// snapshots and the store never interprets them.
///
/// Implementations must satisfy:
/// - `set` replaces the value atomically; a reader sees either the old or
///   the new value, never a mix.
/// - `get` after a successful `set` on the same key returns the new value.
/// - All backend errors are propagated, never silently ignored.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Returns `true` if a value was present.
    async fn remove(&self, key: &str) -> StorageResult<bool>;
}

/// Reject keys no backend can address.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey {
            key: key.to_string(),
            reason: "key is empty".into(),
        });
    }
    Ok(())
}
