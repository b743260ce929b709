//! Directory-backed key-value store.
//!
//! Each key maps to one file under the root directory. File names are the
//! hex encoding of the key, so any key is a valid file name:
//!
//! ```text
//! <root>/<hex(key)>.json
//! ```
//!
//! Writes go to a uniquely named sibling temp file which is then renamed
//! over the target, so a crash mid-write leaves the previous value intact
//! and concurrent writers (other stores or processes on the same
//! directory) never share a temp file. A failed write removes its temp file.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::traits::{validate_key, KeyValueStore};

const VALUE_EXTENSION: &str = "json";

/// Key-value store persisting one file per key in a directory.
#[derive(Debug)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Open (or create) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "file store opened");
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{VALUE_EXTENSION}", hex::encode(key.as_bytes())))
    }
}

/// Write `value` to a fresh temp file in `root`, fsync it, and rename it
/// over `target`. The temp file is deleted on every error path.
fn replace_file(root: &Path, target: &Path, value: &str) -> std::io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(root)?;
    tmp.write_all(value.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let root = self.root.clone();
        let target = self.path_for(key);
        let payload = value.to_owned();

        tokio::task::spawn_blocking(move || replace_file(&root, &target, &payload))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;
        debug!(key, bytes = value.len(), "value written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[tokio::test]
    async fn open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("cart");
        let store = FileKeyValueStore::open(&root).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        assert!(store.get("@products:car").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_get_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileKeyValueStore::open(dir.path()).await.unwrap();
            store.set("@products:car", "[]").await.unwrap();
        }
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        assert_eq!(
            store.get("@products:car").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn key_is_hex_encoded_in_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        store.set("a/b", "v").await.unwrap();
        let path = store.path_for("a/b");
        assert_eq!(path.file_name().unwrap(), "612f62.json");
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn set_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["6b.json".to_string()]);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        store.set("k", "v").await.unwrap();
        assert!(store.remove("k").await.unwrap());
        assert!(!store.remove("k").await.unwrap());
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.get("").await.unwrap_err(),
            StorageError::InvalidKey { .. }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_one_directory_never_mix_values() {
        let dir = tempfile::tempdir().unwrap();
        let first = std::sync::Arc::new(FileKeyValueStore::open(dir.path()).await.unwrap());
        let second = std::sync::Arc::new(FileKeyValueStore::open(dir.path()).await.unwrap());
        let large = "a".repeat(4 * 1024 * 1024);
        let small = "b".repeat(1024 * 1024);

        for _ in 0..10 {
            let (a, b) = (first.clone(), second.clone());
            let (va, vb) = (large.clone(), small.clone());
            let left = tokio::spawn(async move { a.set("k", &va).await });
            let right = tokio::spawn(async move { b.set("k", &vb).await });
            left.await.unwrap().unwrap();
            right.await.unwrap().unwrap();

            let stored = first.get("k").await.unwrap().unwrap();
            assert!(stored == large || stored == small, "stored value mixes both writes");
        }
        assert!(temp_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn failed_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        // A directory in the target's place makes the final rename fail.
        std::fs::create_dir(store.path_for("k")).unwrap();

        let err = store.set("k", "value").await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(temp_files(dir.path()).is_empty());
    }
}
