//! `SQLite` storage for the application catalog.
//!
//! Implements every repository port of `appcat-core` over a single
//! `SqlitePool`, plus schema setup and a factory that wires a `Catalog`.
#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

// Re-export factory for convenient access
pub use factory::CatalogFactory;

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

// Re-export repository implementations
pub use repositories::{
    SqliteComputeResourceRepository, SqliteDeploymentRepository, SqliteGatewayGroupsRepository,
    SqliteGatewayProfileRepository, SqliteGroupProfileRepository, SqliteInterfaceConfigRepository,
    SqliteInterfaceRepository, SqliteModuleRepository, SqliteStorageResourceRepository,
    SqliteUserProfileRepository,
};

// Re-export setup functions for convenient access
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
