//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the CLI opens the database. Handlers
//! receive the composed `CliContext` and go through its `Catalog`.

use appcat_core::{Catalog, CatalogConfig};
use appcat_db::{CatalogFactory, setup_database};
use tracing::debug;

use crate::error::CliError;

/// Everything a command handler needs.
pub struct CliContext {
    catalog: Catalog,
    config: CatalogConfig,
}

impl CliContext {
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The resolved configuration the database was opened with.
    pub const fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

/// Resolve configuration, open the database and compose the catalog.
///
/// Configuration comes from the `APPCAT_*` environment variables; a
/// `--database` value on the command line wins over them.
pub async fn bootstrap(database_override: Option<String>) -> Result<CliContext, CliError> {
    let mut config = CatalogConfig::from_env()?;
    if let Some(url) = database_override {
        config.database_url = url;
        config.validate()?;
    }
    debug!(database = %config.database_url, "Bootstrapping catalog");

    let pool = setup_database(&config)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))?;

    Ok(CliContext {
        catalog: CatalogFactory::build_catalog(pool),
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");

        let ctx = bootstrap(Some(path.display().to_string())).await.unwrap();

        assert!(path.exists());
        assert_eq!(
            ctx.catalog()
                .gateway_profiles()
                .get_all_gateway_profiles()
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_empty_database() {
        let err = bootstrap(Some("  ".to_string())).await.err().unwrap();
        assert!(matches!(err, CliError::Config(_)));
    }
}
