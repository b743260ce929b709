//! Storage doubles for exercising the persistence writer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cart_storage::{InMemoryKeyValueStore, KeyValueStore, StorageError, StorageResult};
use cart_types::ProductDescriptor;

/// In-memory store that records every write and can be told to fail or
/// stall them.
#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    inner: InMemoryKeyValueStore,
    writes: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
    write_delay: Option<Duration>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn seeded(key: &str, value: &str) -> Self {
        Self {
            inner: InMemoryKeyValueStore::with_entries([(key, value)]),
            ..Self::default()
        }
    }

    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.writes.lock().unwrap().push(value.to_string());
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        self.inner.remove(key).await
    }
}

/// Store whose reads always fail.
#[derive(Debug, Default)]
pub(crate) struct UnreadableStore;

#[async_trait]
impl KeyValueStore for UnreadableStore {
    async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Io(std::io::Error::other("permission denied")))
    }

    async fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }
}

pub(crate) fn shoe() -> ProductDescriptor {
    ProductDescriptor::new("p1", "Shoe", "u", 10.0)
}

pub(crate) fn hat() -> ProductDescriptor {
    ProductDescriptor::new("p2", "Hat", "h", 4.5)
}
