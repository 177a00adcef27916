//! # Tepian Effects
//!
//! Concrete handlers for the effect traits declared in `tepian-core`.
//!
//! - [`MemoryStorageHandler`]: process-local map, used by tests and by hosts
//!   configured with the `memory` backend
//! - [`FilesystemStorageHandler`]: one file per key under a data directory,
//!   written atomically
//!
//! [`storage_from_config`] builds the handler a host asked for.

pub mod storage;

pub use storage::{storage_from_config, FilesystemStorageHandler, MemoryStorageHandler};
