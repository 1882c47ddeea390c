//! Composition utilities for building a `Catalog` with `SQLite` backends.
//!
//! This module wires repositories together. It holds no domain logic.

use sqlx::SqlitePool;
use std::sync::Arc;

use appcat_core::{Catalog, CatalogConfig, Repos};

use crate::repositories::{
    SqliteComputeResourceRepository, SqliteDeploymentRepository, SqliteGatewayGroupsRepository,
    SqliteGatewayProfileRepository, SqliteGroupProfileRepository, SqliteInterfaceConfigRepository,
    SqliteInterfaceRepository, SqliteModuleRepository, SqliteStorageResourceRepository,
    SqliteUserProfileRepository,
};
use crate::setup::setup_database;

/// Factory for creating repository instances with `SQLite` backends.
pub struct CatalogFactory;

impl CatalogFactory {
    /// Open (and if needed initialize) the database described by `config`.
    pub async fn create_pool(config: &CatalogConfig) -> anyhow::Result<SqlitePool> {
        setup_database(config).await
    }

    /// Build all `SQLite` repositories from a pool.
    ///
    /// Returns a `Repos` struct from `appcat-core` holding trait objects.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos {
            compute_resources: Arc::new(SqliteComputeResourceRepository::new(pool.clone())),
            interface_configs: Arc::new(SqliteInterfaceConfigRepository::new(pool.clone())),
            storage_resources: Arc::new(SqliteStorageResourceRepository::new(pool.clone())),
            app_modules: Arc::new(SqliteModuleRepository::new(pool.clone())),
            app_interfaces: Arc::new(SqliteInterfaceRepository::new(pool.clone())),
            app_deployments: Arc::new(SqliteDeploymentRepository::new(pool.clone())),
            gateway_profiles: Arc::new(SqliteGatewayProfileRepository::new(pool.clone())),
            group_profiles: Arc::new(SqliteGroupProfileRepository::new(pool.clone())),
            user_profiles: Arc::new(SqliteUserProfileRepository::new(pool.clone())),
            gateway_groups: Arc::new(SqliteGatewayGroupsRepository::new(pool)),
        }
    }

    /// Build a complete `Catalog` from a pool.
    ///
    /// ```ignore
    /// use appcat_db::{CatalogFactory, setup_database};
    ///
    /// let pool = setup_database(&config).await?;
    /// let catalog = CatalogFactory::build_catalog(pool);
    /// ```
    pub fn build_catalog(pool: SqlitePool) -> Catalog {
        Catalog::new(Self::build_repos(pool))
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database with the production schema and
/// the default gateway profile already applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A `Catalog` backed by this database.
    pub fn catalog(&self) -> Catalog {
        CatalogFactory::build_catalog(self.pool.clone())
    }

    pub fn compute_repository(&self) -> SqliteComputeResourceRepository {
        SqliteComputeResourceRepository::new(self.pool.clone())
    }

    pub fn group_profile_repository(&self) -> SqliteGroupProfileRepository {
        SqliteGroupProfileRepository::new(self.pool.clone())
    }

    pub fn gateway_profile_repository(&self) -> SqliteGatewayProfileRepository {
        SqliteGatewayProfileRepository::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_sees_seeded_gateway() {
        let db = TestDb::new().await.unwrap();
        let catalog = db.catalog();

        let profiles = catalog.gateway_profiles().get_all_gateway_profiles().await.unwrap();

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].gateway_id, CatalogConfig::in_memory().default_gateway_id);
    }
}
