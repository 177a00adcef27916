use crate::core::SnapshotError;
use tepian_core::StorageError;
use thiserror::Error;

/// Failures inside the cart's persistence path.
///
/// Cart operations never return these; they are logged and reported to
/// observers as [`crate::CartWarning::PersistFailed`].
#[derive(Debug, Error)]
pub enum CartError {
    /// Storage handler failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Snapshot encode/decode failure
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
