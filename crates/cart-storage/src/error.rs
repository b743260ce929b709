/// Errors from key-value storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used with this backend.
    #[error("invalid storage key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("storage lock poisoned: {0}")]
    Poisoned(String),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
