//! Storage effect: a synchronous named-entry key-value store.
//!
//! This is the seam behind which durable client storage sits. The cart core
//! only ever writes and reads a single key, but handlers accept any key that
//! passes [`validate_key`].

use thiserror::Error;

/// Longest accepted storage key.
pub const MAX_KEY_LEN: usize = 255;

/// Errors surfaced by storage handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The key is empty, too long, or would escape the storage namespace.
    #[error("Invalid storage key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },

    /// Reading an entry failed.
    #[error("Storage read failed: {0}")]
    ReadFailed(String),

    /// Writing an entry failed.
    #[error("Storage write failed: {0}")]
    WriteFailed(String),

    /// Removing an entry failed.
    #[error("Storage delete failed: {0}")]
    DeleteFailed(String),

    /// The handler could not be set up.
    #[error("Storage configuration error: {reason}")]
    ConfigurationError {
        /// What was wrong with the configuration
        reason: String,
    },
}

/// Synchronous key-value storage.
///
/// Access is local and blocking, the same shape as browser local storage.
/// Handlers must be shareable across threads so a single instance can be
/// injected into the cart core and any host tooling at the same time.
pub trait StorageEffects: Send + Sync {
    /// Write `value` under `key`, replacing any previous entry.
    fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Read the entry under `key`, or `None` when nothing is stored.
    fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Delete the entry under `key`. Returns whether an entry existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// Short backend name for logs.
    fn backend_type(&self) -> &'static str;
}

/// Check that a key is usable by every handler.
///
/// Keys double as file names in the filesystem handler, so anything that
/// could address a different directory is refused.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey {
            reason: "Key cannot be empty".to_string(),
        });
    }

    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey {
            reason: format!("Key too long (max {MAX_KEY_LEN} characters)"),
        });
    }

    if key.starts_with('.') {
        return Err(StorageError::InvalidKey {
            reason: format!("Key '{key}' cannot start with '.'"),
        });
    }

    if key.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidKey {
            reason: format!("Key '{key}' contains a path separator or NUL"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn plain_keys_are_accepted() {
        assert!(validate_key("cart").is_ok());
        assert!(validate_key("tepian-cart_v2").is_ok());
    }

    #[test]
    fn empty_key_is_rejected() {
        assert_matches!(validate_key(""), Err(StorageError::InvalidKey { .. }));
    }

    #[test]
    fn path_like_keys_are_rejected() {
        assert_matches!(validate_key("../cart"), Err(StorageError::InvalidKey { .. }));
        assert_matches!(validate_key("a/b"), Err(StorageError::InvalidKey { .. }));
        assert_matches!(validate_key("a\\b"), Err(StorageError::InvalidKey { .. }));
        assert_matches!(validate_key(".hidden"), Err(StorageError::InvalidKey { .. }));
    }

    #[test]
    fn overlong_key_is_rejected() {
        let key = "k".repeat(MAX_KEY_LEN + 1);
        assert_matches!(validate_key(&key), Err(StorageError::InvalidKey { .. }));
        assert!(validate_key(&"k".repeat(MAX_KEY_LEN)).is_ok());
    }
}
