//! Sweeper configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Sweeper process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweeperConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Seconds between sweeps, always > 0
    pub sweep_interval: Duration,

    /// Pool size
    pub max_connections: u32,

    /// Run a single pass and exit (cron style)
    pub run_once: bool,
}

impl SweeperConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_secs: u64 = lookup("PROMO_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|| "300".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PROMO_SWEEP_INTERVAL_SECS".to_string()))?;
        if interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PROMO_SWEEP_INTERVAL_SECS".to_string(),
            ));
        }

        let config = SweeperConfig {
            db_path: lookup("PROMO_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./promo.db")),

            sweep_interval: Duration::from_secs(interval_secs),

            max_connections: lookup("PROMO_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PROMO_DB_MAX_CONNECTIONS".to_string()))?,

            run_once: lookup("PROMO_SWEEP_ONCE")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PROMO_SWEEP_ONCE".to_string()))?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PROMO_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
