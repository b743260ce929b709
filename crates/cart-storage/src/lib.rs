//! Key-value storage backends for Cart Keeper.
//!
//! The cart persists its snapshot as a single string value under a fixed
//! key. Backends implement the async [`KeyValueStore`] trait:
//!
//! - [`InMemoryKeyValueStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileKeyValueStore`] -- one file per key in a directory, atomic replace
//!
//! # Design Rules
//!
//! 1. Values are opaque strings; backends never parse them.
//! 2. A `set` is all-or-nothing from a reader's point of view.
//! 3. Absence is `Ok(None)`, not an error.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
pub use traits::KeyValueStore;
