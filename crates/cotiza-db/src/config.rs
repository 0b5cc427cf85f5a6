//! Cotiza configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                     | Default        |
//! |------------------------------|----------------|
//! | `COTIZA_DB_PATH`             | `./cotiza.db`  |
//! | `COTIZA_DB_MAX_CONNECTIONS`  | `5`            |
//! | `COTIZA_ALLOCATION_RETRIES`  | `3`            |
//! | `COTIZA_VERTICAL_PREFIX`     | unset          |

use std::env;
use std::path::PathBuf;

use cotiza_core::TypePrefix;
use serde::{Deserialize, Serialize};

use crate::allocator::DEFAULT_MAX_ATTEMPTS;
use crate::pool::DbConfig;

/// Cotiza configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CotizaConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Attempts per code allocation before reporting a conflict
    pub allocation_retries: u32,

    /// 2-letter code used for vertical projects instead of deriving it from
    /// the project name
    pub vertical_prefix: Option<String>,
}

impl Default for CotizaConfig {
    fn default() -> Self {
        CotizaConfig {
            database_path: PathBuf::from("./cotiza.db"),
            max_connections: 5,
            allocation_retries: DEFAULT_MAX_ATTEMPTS,
            vertical_prefix: None,
        }
    }
}

impl CotizaConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (environment, map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CotizaConfig::default();

        let config = CotizaConfig {
            database_path: lookup("COTIZA_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: lookup("COTIZA_DB_MAX_CONNECTIONS")
                .map(|v| v.trim().parse())
                .transpose()
                .map_err(|_| ConfigError::InvalidValue("COTIZA_DB_MAX_CONNECTIONS".to_string()))?
                .unwrap_or(defaults.max_connections),

            allocation_retries: lookup("COTIZA_ALLOCATION_RETRIES")
                .map(|v| v.trim().parse())
                .transpose()
                .map_err(|_| ConfigError::InvalidValue("COTIZA_ALLOCATION_RETRIES".to_string()))?
                .unwrap_or(defaults.allocation_retries),

            vertical_prefix: lookup("COTIZA_VERTICAL_PREFIX")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "COTIZA_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.allocation_retries == 0 {
            return Err(ConfigError::InvalidValue(
                "COTIZA_ALLOCATION_RETRIES".to_string(),
            ));
        }

        if let Some(prefix) = &config.vertical_prefix {
            let valid = TypePrefix::new(prefix).is_ok_and(|p| !p.is_residential());
            if !valid {
                return Err(ConfigError::InvalidValue(
                    "COTIZA_VERTICAL_PREFIX".to_string(),
                ));
            }
        }

        Ok(config)
    }

    /// Pool settings for this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
