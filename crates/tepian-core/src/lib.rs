//! # Tepian Core
//!
//! Foundation layer shared by every Tepian crate:
//!
//! - [`effects`]: the storage effect trait that stands in for durable client
//!   storage, together with its error type
//! - [`config`]: TOML configuration loaded by hosts at startup
//!
//! This crate holds no handlers. Concrete storage backends live in
//! `tepian-effects`; the cart state container lives in `tepian-app`.

pub mod config;
pub mod effects;

pub use config::{
    CartConfig, ConfigError, LoggingConfig, StorageBackend, StorageConfig, TepianConfig,
};
pub use effects::{StorageEffects, StorageError};
