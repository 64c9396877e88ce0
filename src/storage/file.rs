use std::path::{Path, PathBuf};

use super::{StorageBackend, StorageError};

/// File-backed slot: the whole collection lives in one JSON file.
///
/// Writes go through a sibling temp file followed by a rename, so a
/// failed write never corrupts the previously stored blob.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend at the default application location
    /// (`~/DermAssist/analysis-history.json`).
    pub fn at_default_location() -> Self {
        Self::new(crate::config::history_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let parent = self.path.parent().ok_or_else(|| {
            StorageError::Unavailable(format!("no parent directory for {}", self.path.display()))
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = self.temp_path();
        std::fs::write(&temp, bytes)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
