//! Host configuration.
//!
//! Loaded from a TOML file at startup. Every section and field is optional so
//! an empty (or missing) file yields a working default setup.

use crate::effects::{validate_key, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage entry the cart is mirrored to unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`TepianConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `[cart] storage_key` is not a usable storage key.
    #[error("Invalid cart storage key: {0}")]
    InvalidStorageKey(#[source] StorageError),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TepianConfig {
    /// Where the cart snapshot is kept
    pub storage: StorageConfig,
    /// Cart container settings
    pub cart: CartConfig,
    /// Log filter settings
    pub logging: LoggingConfig,
}

impl TepianConfig {
    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist. A file that exists but cannot be parsed is still an
    /// error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Parse configuration from TOML text and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_key(&self.cart.storage_key).map_err(ConfigError::InvalidStorageKey)
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key under [`StorageConfig::dir`]
    #[default]
    Filesystem,
    /// Process-local map; nothing survives exit
    Memory,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to construct
    pub backend: StorageBackend,
    /// Data directory for the filesystem backend
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Directory for the filesystem backend.
    ///
    /// Uses the configured `dir` when set, otherwise `<platform data dir>/tepian`,
    /// otherwise `./.tepian` when the platform reports no data directory.
    pub fn resolved_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .map(|d| d.join("tepian"))
            .unwrap_or_else(|| PathBuf::from(".tepian"))
    }
}

/// `[cart]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Storage key holding the persisted line items
    pub storage_key: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive, e.g. `info` or `tepian_app=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
