//! Effect traits implemented by `tepian-effects` handlers.

mod storage;

pub use storage::{validate_key, StorageEffects, StorageError};
