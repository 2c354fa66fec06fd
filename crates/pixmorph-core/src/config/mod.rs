//! Configuration management for Pixmorph.
//!
//! Configuration is loaded once at startup from `config.toml` with sensible
//! defaults and then passed by reference to the components that need it.
//! Nothing in the core reads the environment on its own.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Pixmorph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Object store and catalog settings
    pub storage: StorageConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Request rate limiting
    pub rate_limit: RateLimitConfig,

    /// Encoder settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.pixmorph.pixmorph/config.toml
    /// - Linux: ~/.config/pixmorph/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\pixmorph\config\config.toml
    ///
    /// Falls back to ~/.pixmorph/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "pixmorph", "pixmorph")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".pixmorph").join("config.toml")
            })
    }

    /// Get the resolved catalog path (with ~ expansion).
    pub fn catalog_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.storage.catalog_path);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
