//! Filesystem storage handler
//!
//! Each key maps to `<base>/<key>.json`. Writes go through a uniquely named
//! temp file in the same directory that is synced and then renamed over the
//! target, so a concurrent reader sees either the old or the new contents. A
//! failed write removes its temp file. Separate processes sharing a directory
//! are not otherwise coordinated: the last rename wins.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tepian_core::effects::validate_key;
use tepian_core::{StorageEffects, StorageError};
use tracing::{debug, info};

const ENTRY_EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = ".tmp";

/// Filesystem-based storage handler
#[derive(Debug, Clone)]
pub struct FilesystemStorageHandler {
    base_path: PathBuf,
}

impl FilesystemStorageHandler {
    /// Create a handler rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).map_err(|e| StorageError::ConfigurationError {
            reason: format!(
                "Failed to create storage directory {}: {e}",
                base_path.display()
            ),
        })?;

        info!("Initialized filesystem storage at {:?}", base_path);

        Ok(Self { base_path })
    }

    /// Directory holding the entries.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File backing `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.{ENTRY_EXTENSION}"))
    }

    // Temp names start with '.', which valid keys never do, so they cannot
    // shadow an entry. The temp file is deleted on drop unless persisted.
    fn write_atomic(&self, key: &str, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let prefix = format!(".{key}.");
        let mut temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.base_path)
            .map_err(|e| StorageError::WriteFailed(format!("Failed to create temp file: {e}")))?;

        temp.write_all(data)
            .map_err(|e| StorageError::WriteFailed(format!("Failed to write data: {e}")))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| StorageError::WriteFailed(format!("Failed to sync temp file: {e}")))?;

        temp.persist(path).map_err(|e| {
            StorageError::WriteFailed(format!("Failed to rename temp file: {}", e.error))
        })?;
        Ok(())
    }
}

impl StorageEffects for FilesystemStorageHandler {
    fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.entry_path(key);
        self.write_atomic(key, &path, &value)?;
        debug!(key, bytes = value.len(), "Stored entry");
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        match fs::read(self.entry_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(format!(
                "Failed to read entry '{key}': {e}"
            ))),
        }
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to remove entry '{key}': {e}"
            ))),
        }
    }

    fn backend_type(&self) -> &'static str {
        "filesystem"
    }
}
