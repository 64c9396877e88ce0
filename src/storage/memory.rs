use std::sync::RwLock;

use super::{StorageBackend, StorageError};

/// In-memory backend backed by RwLock.
/// Used by tests and by ephemeral (no-persistence) sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slot: RwLock<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let slot = self.slot.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(slot.clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let mut slot = self.slot.write().map_err(|_| StorageError::LockPoisoned)?;
        *slot = Some(bytes.to_vec());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        let mut slot = self.slot.write().map_err(|_| StorageError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }
}
