//! Model configuration
//!
//! Loaded from a TOML file when one is given, defaults otherwise:
//!
//! ```toml
//! [logging]
//! profile = "production"
//!
//! [store]
//! max_rows_per_query = 10000
//! wal = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::logging_facility::Profile;
use crate::store::ReadLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Row limit for list lookups; unlimited when absent
    pub max_rows_per_query: Option<usize>,
    /// Open SQLite files in WAL journal mode
    pub wal: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_rows_per_query: None,
            wal: true,
        }
    }
}

impl StoreConfig {
    pub fn read_limits(&self) -> ReadLimits {
        ReadLimits {
            max_rows_per_query: self.max_rows_per_query,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub logging: LoggingConfig,
    pub store: StoreConfig,
}

impl ModelConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when given, defaults otherwise
    ///
    /// # Errors
    ///
    /// Same as [`ModelConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}
