//! CLI-specific error types and exit codes.

use appcat_core::{CatalogError, ConfigError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected by the catalog or the command line.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => 1,
            Self::Arguments(_) => 2,
            Self::Io(_) => 74,
            Self::Config(_) => 78,
            Self::Database(_) => 73,
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(msg) => Self::NotFound(msg),
            CatalogError::InvalidInput(msg) => Self::Arguments(msg),
            CatalogError::AlreadyExists(msg) => Self::Arguments(format!("already exists: {msg}")),
            CatalogError::Storage(msg) => Self::Database(msg),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Arguments(format!("malformed JSON: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_errors_map_to_exit_codes() {
        let not_found: CliError = CatalogError::NotFound("x".into()).into();
        assert_eq!(not_found.exit_code(), 1);

        let invalid: CliError = CatalogError::InvalidInput("bad key".into()).into();
        assert_eq!(invalid.exit_code(), 2);

        let storage: CliError = CatalogError::Storage("disk".into()).into();
        assert_eq!(storage.exit_code(), 73);
    }

    #[test]
    fn test_config_error_maps_to_config() {
        let err: CliError = ConfigError::EmptyDatabaseUrl.into();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 78);
    }
}
