//! Gateway resource profile repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::GatewayResourceProfile;

/// Repository for gateway resource profiles, keyed by gateway id.
///
/// # Design Rules
///
/// - Compute preferences are keyed by compute resource id and storage
///   preferences by storage resource id
/// - `update` applies each preference list as a replacement with orphan
///   removal, independently of the other list
#[async_trait]
pub trait GatewayProfileRepository: Send + Sync {
    /// Returns `Err(RepositoryError::AlreadyExists)` if the gateway has a profile.
    async fn insert(&self, profile: &GatewayResourceProfile) -> Result<(), RepositoryError>;
    async fn get(&self, gateway_id: &str) -> Result<GatewayResourceProfile, RepositoryError>;
    async fn update(&self, profile: &GatewayResourceProfile) -> Result<(), RepositoryError>;
    async fn delete(&self, gateway_id: &str) -> Result<(), RepositoryError>;
    async fn exists(&self, gateway_id: &str) -> Result<bool, RepositoryError>;
    async fn list(&self) -> Result<Vec<GatewayResourceProfile>, RepositoryError>;

    /// Returns `Err(RepositoryError::NotFound)` if no such preference is stored.
    async fn delete_compute_preference(
        &self,
        gateway_id: &str,
        compute_resource_id: &str,
    ) -> Result<(), RepositoryError>;

    /// Returns `Err(RepositoryError::NotFound)` if no such preference is stored.
    async fn delete_storage_preference(
        &self,
        gateway_id: &str,
        storage_resource_id: &str,
    ) -> Result<(), RepositoryError>;
}
