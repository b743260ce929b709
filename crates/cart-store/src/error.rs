use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was requested from a scope no store has been provided to.
    #[error("cart must be used within an initialized cart scope")]
    Uninitialized,

    #[error("a cart store has already been provided to this scope")]
    AlreadyProvided,

    /// The persisted snapshot could not be decoded.
    #[error("corrupt cart snapshot under {key:?}: {reason}")]
    CorruptSnapshot { key: String, reason: String },

    /// Persisting the snapshot produced by mutation `seq` failed.
    #[error("failed to persist cart at sequence {seq}: {reason}")]
    Persist { seq: u64, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] cart_storage::StorageError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type CartResult<T> = Result<T, CartError>;
