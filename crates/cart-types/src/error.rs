use thiserror::Error;

/// Errors produced by snapshot encoding and decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("failed to decode cart snapshot: {0}")]
    Decode(String),

    #[error("failed to encode cart snapshot: {0}")]
    Encode(String),
}
