//! Port definitions (trait abstractions) for catalog storage.
//!
//! Ports define the interfaces that the catalog services expect from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - Single-entity reads return `RepositoryError::NotFound` when absent;
//!   services turn that into `Option`
//! - Every mutating method is one atomic unit of work

pub mod application_repository;
pub mod compute_repository;
pub mod gateway_groups_repository;
pub mod gateway_profile_repository;
pub mod group_profile_repository;
pub mod interface_config_repository;
pub mod storage_repository;
pub mod user_profile_repository;

use std::sync::Arc;
use thiserror::Error;

use crate::filter::FilterError;
use crate::sync::DuplicateKey;

// Re-export repository traits for convenience
pub use application_repository::{
    ApplicationDeploymentRepository, ApplicationInterfaceRepository, ApplicationModuleRepository,
};
pub use compute_repository::ComputeResourceRepository;
pub use gateway_groups_repository::GatewayGroupsRepository;
pub use gateway_profile_repository::GatewayProfileRepository;
pub use group_profile_repository::GroupProfileRepository;
pub use interface_config_repository::InterfaceConfigRepository;
pub use storage_repository::StorageResourceRepository;
pub use user_profile_repository::UserProfileRepository;

/// Container for all repository trait objects.
///
/// This struct wires repositories into the services without coupling them to
/// concrete implementations. It lives in `appcat-core` so that `Catalog` can
/// accept it without depending on `appcat-db`.
///
/// ```ignore
/// let repos = appcat_db::CatalogFactory::build_repos(pool);
/// let catalog = Catalog::new(repos);
/// ```
#[derive(Clone)]
pub struct Repos {
    pub compute_resources: Arc<dyn ComputeResourceRepository>,
    /// Submission and data movement configurations.
    pub interface_configs: Arc<dyn InterfaceConfigRepository>,
    pub storage_resources: Arc<dyn StorageResourceRepository>,
    pub app_modules: Arc<dyn ApplicationModuleRepository>,
    pub app_interfaces: Arc<dyn ApplicationInterfaceRepository>,
    pub app_deployments: Arc<dyn ApplicationDeploymentRepository>,
    pub gateway_profiles: Arc<dyn GatewayProfileRepository>,
    pub group_profiles: Arc<dyn GroupProfileRepository>,
    pub user_profiles: Arc<dyn UserProfileRepository>,
    pub gateway_groups: Arc<dyn GatewayGroupsRepository>,
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored value could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A replacement collection repeated a child key.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl From<DuplicateKey> for RepositoryError {
    fn from(e: DuplicateKey) -> Self {
        Self::InvalidKey(e.to_string())
    }
}

/// Error type returned by every catalog service.
///
/// Callers branch on the variant: absent targets, bad input, id collisions
/// and storage failures are always distinguishable.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Update or remove targeted an entity that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was malformed (unknown filter key, incomplete key, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An add collided with an existing id.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The store failed. Nothing from the failed call was committed.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl CatalogError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

impl From<RepositoryError> for CatalogError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(what) => Self::NotFound(what),
            RepositoryError::AlreadyExists(what) => Self::AlreadyExists(what),
            RepositoryError::InvalidKey(what) => Self::InvalidInput(what),
            RepositoryError::Storage(msg) | RepositoryError::Serialization(msg) => {
                Self::Storage(msg)
            }
        }
    }
}

impl From<FilterError> for CatalogError {
    fn from(e: FilterError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

/// Map a repository read to `Option`, keeping every other failure.
pub(crate) fn found<T>(result: Result<T, RepositoryError>) -> Result<Option<T>, CatalogError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RepositoryError::NotFound(_)) => Ok(None),
        Err(e) => Err(CatalogError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_keep_their_class() {
        assert!(CatalogError::from(RepositoryError::NotFound("x".into())).is_not_found());
        assert!(CatalogError::from(RepositoryError::AlreadyExists("x".into())).is_already_exists());
        assert!(CatalogError::from(RepositoryError::InvalidKey("x".into())).is_invalid_input());
        assert!(matches!(
            CatalogError::from(RepositoryError::Serialization("bad json".into())),
            CatalogError::Storage(_)
        ));
    }

    #[test]
    fn test_found_maps_not_found_to_none() {
        let absent: Result<u8, _> = Err(RepositoryError::NotFound("id".into()));
        assert!(found(absent).unwrap().is_none());

        let present: Result<u8, RepositoryError> = Ok(7);
        assert_eq!(found(present).unwrap(), Some(7));

        let broken: Result<u8, _> = Err(RepositoryError::Storage("disk".into()));
        assert!(matches!(found(broken), Err(CatalogError::Storage(_))));
    }
}
