//! Catalog configuration.
//!
//! Pure configuration types with no infrastructure dependencies. Entry points
//! load `.env` files themselves and then call `CatalogConfig::from_env`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default database location for command-line use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://appcat.db";

/// Gateway whose resource profile every fresh catalog starts with.
pub const DEFAULT_GATEWAY_ID: &str = "default";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub const ENV_DATABASE_URL: &str = "APPCAT_DATABASE_URL";
pub const ENV_DEFAULT_GATEWAY: &str = "APPCAT_DEFAULT_GATEWAY";
pub const ENV_MAX_CONNECTIONS: &str = "APPCAT_MAX_CONNECTIONS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Default gateway id cannot be empty")]
    EmptyGatewayId,

    #[error("Database URL cannot be empty")]
    EmptyDatabaseUrl,

    #[error("Max connections must be at least 1")]
    ZeroConnections,

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Settings for opening and seeding a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// `SQLite` URL or plain file path.
    pub database_url: String,
    pub default_gateway_id: String,
    pub max_connections: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CatalogConfig {
    /// Create a config with the stock defaults.
    pub fn with_defaults() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            default_gateway_id: DEFAULT_GATEWAY_ID.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// An in-memory catalog, for tests.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Self::with_defaults()
        }
    }

    /// Defaults overridden by `APPCAT_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_defaults().apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, then validate.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database_url = url;
        }
        if let Some(gateway) = lookup(ENV_DEFAULT_GATEWAY) {
            self.default_gateway_id = gateway;
        }
        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            self.max_connections = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_MAX_CONNECTIONS,
                value: raw.clone(),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if self.default_gateway_id.trim().is_empty() {
            return Err(ConfigError::EmptyGatewayId);
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ZeroConnections);
        }
        Ok(())
    }

    /// Whether the database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |name| map.get(name).map(|v| (*v).to_string())
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(CatalogConfig::with_defaults().validate().is_ok());
        assert!(CatalogConfig::in_memory().is_in_memory());
    }

    #[test]
    fn test_overrides_apply() {
        let config = CatalogConfig::with_defaults()
            .apply_overrides(lookup(&[
                (ENV_DATABASE_URL, "sqlite:///tmp/cat.db"),
                (ENV_DEFAULT_GATEWAY, "seagrid"),
                (ENV_MAX_CONNECTIONS, "2"),
            ]))
            .unwrap();

        assert_eq!(config.database_url, "sqlite:///tmp/cat.db");
        assert_eq!(config.default_gateway_id, "seagrid");
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn test_bad_connection_count_is_rejected() {
        let err = CatalogConfig::with_defaults()
            .apply_overrides(lookup(&[(ENV_MAX_CONNECTIONS, "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));

        let err = CatalogConfig::with_defaults()
            .apply_overrides(lookup(&[(ENV_MAX_CONNECTIONS, "0")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroConnections);
    }

    #[test]
    fn test_empty_gateway_is_rejected() {
        let err = CatalogConfig::with_defaults()
            .apply_overrides(lookup(&[(ENV_DEFAULT_GATEWAY, " ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyGatewayId);
    }
}
