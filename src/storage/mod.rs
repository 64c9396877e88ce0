//! Storage seam for the history store.
//!
//! The store persists its whole collection as one opaque blob behind
//! [`StorageBackend`], so tests run against [`MemoryBackend`] and the
//! application against [`FileBackend`] without touching store logic.

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// One durable slot holding the serialized history collection.
///
/// Implementations must treat `write` as atomic: a failed write leaves
/// the previously stored blob intact.
pub trait StorageBackend {
    /// Read the stored blob. `Ok(None)` when nothing was ever written.
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the stored blob.
    fn write(&self, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove the stored blob. Removing an empty slot is not an error.
    fn remove(&self) -> Result<(), StorageError>;
}
