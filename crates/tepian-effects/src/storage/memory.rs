//! In-memory storage handler

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tepian_core::effects::validate_key;
use tepian_core::{StorageEffects, StorageError};

/// In-memory storage handler.
///
/// Clones share the same map, so a test can keep one clone to inspect what
/// the cart wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageHandler {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorageHandler {
    /// Create a new memory storage handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handler pre-populated with `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        Self {
            data: Arc::new(RwLock::new(entries.into_iter().collect())),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl StorageEffects for MemoryStorageHandler {
    fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        validate_key(key)?;
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        Ok(self.data.read().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(self.data.write().remove(key).is_some())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
