//! Service configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                        | Default        |
//! |---------------------------------|----------------|
//! | `CATALOG_DATABASE_PATH`         | `./catalog.db` |
//! | `CATALOG_MAX_CONNECTIONS`       | `5`            |
//! | `CATALOG_MIN_CONNECTIONS`       | `1`            |
//! | `CATALOG_CONNECT_TIMEOUT_SECS`  | `30`           |
//! | `CATALOG_STOCK_MAX_ATTEMPTS`    | `5`            |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::pool::DbConfig;
use crate::stock::StockPolicy;

/// Catalog service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool upper bound
    pub max_connections: u32,

    /// Pool lower bound
    pub min_connections: u32,

    /// Pool acquire timeout in seconds
    pub connect_timeout_secs: u64,

    /// Compare-and-swap attempts per stock operation before giving up
    pub stock_max_attempts: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            database_path: PathBuf::from("./catalog.db"),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 30,
            stock_max_attempts: StockPolicy::default().max_attempts,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CatalogConfig::default();

        let config = CatalogConfig {
            database_path: lookup("CATALOG_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, "CATALOG_MAX_CONNECTIONS", defaults.max_connections)?,

            min_connections: parse_or(&lookup, "CATALOG_MIN_CONNECTIONS", defaults.min_connections)?,

            connect_timeout_secs: parse_or(
                &lookup,
                "CATALOG_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,

            stock_max_attempts: parse_or(
                &lookup,
                "CATALOG_STOCK_MAX_ATTEMPTS",
                defaults.stock_max_attempts,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("CATALOG_MAX_CONNECTIONS".to_string()));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::PoolBounds {
                min: self.min_connections,
                max: self.max_connections,
            });
        }
        if self.stock_max_attempts == 0 {
            return Err(ConfigError::InvalidValue("CATALOG_STOCK_MAX_ATTEMPTS".to_string()));
        }
        Ok(())
    }

    /// Pool settings for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }

    pub fn stock_policy(&self) -> StockPolicy {
        StockPolicy {
            max_attempts: self.stock_max_attempts,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Pool minimum {min} exceeds maximum {max}")]
    PoolBounds { min: u32, max: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.stock_policy().max_attempts, 5);
    }

    #[test]
    fn test_overrides() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("CATALOG_DATABASE_PATH", "/tmp/shop.db"),
            ("CATALOG_MAX_CONNECTIONS", "8"),
            ("CATALOG_STOCK_MAX_ATTEMPTS", " 12 "),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.stock_max_attempts, 12);

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values() {
        let err = CatalogConfig::from_lookup(lookup(&[("CATALOG_MAX_CONNECTIONS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == "CATALOG_MAX_CONNECTIONS"));

        let err = CatalogConfig::from_lookup(lookup(&[("CATALOG_STOCK_MAX_ATTEMPTS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        let err = CatalogConfig::from_lookup(lookup(&[
            ("CATALOG_MIN_CONNECTIONS", "6"),
            ("CATALOG_MAX_CONNECTIONS", "2"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PoolBounds { min: 6, max: 2 }));
    }
}
