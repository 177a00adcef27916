//! Storage effect handlers.

mod filesystem;
mod memory;

pub use filesystem::FilesystemStorageHandler;
pub use memory::MemoryStorageHandler;

use std::sync::Arc;
use tepian_core::{StorageBackend, StorageConfig, StorageEffects, StorageError};

/// Build the storage handler selected by `config`.
pub fn storage_from_config(
    config: &StorageConfig,
) -> Result<Arc<dyn StorageEffects>, StorageError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorageHandler::new())),
        StorageBackend::Filesystem => Ok(Arc::new(FilesystemStorageHandler::new(
            config.resolved_dir(),
        )?)),
    }
}
