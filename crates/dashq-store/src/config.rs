//! Store configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) is a valid configuration.
//!
//! ```toml
//! db_path = "/var/lib/dashq/dashq.db"
//! busy_timeout_ms = 2000
//! wal = true
//! default_search_limit = 50
//! ```

use crate::errors::{config_error, io_error, Result};
use dashq_core::model::DEFAULT_SEARCH_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    /// How long a writer waits on a locked database before failing
    pub busy_timeout_ms: u64,
    /// Use write-ahead logging (file databases only)
    pub wal: bool,
    /// Page size for searches that do not request one
    pub default_search_limit: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".dashq/dashq.db"),
            busy_timeout_ms: 5000,
            wal: true,
            default_search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StoreConfig =
            toml::from_str(text).map_err(|e| config_error(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| io_error("read_config", e))?;
        Self::from_toml_str(&text)
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_search_limit <= 0 {
            return Err(config_error("default_search_limit must be positive"));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(config_error("db_path must not be empty"));
        }
        Ok(())
    }
}
