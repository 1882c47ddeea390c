//! Gateway groups repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::GatewayGroups;

/// Repository for gateway group records, keyed by gateway id.
#[async_trait]
pub trait GatewayGroupsRepository: Send + Sync {
    /// Returns `Err(RepositoryError::AlreadyExists)` if the gateway has a record.
    async fn insert(&self, groups: &GatewayGroups) -> Result<(), RepositoryError>;
    async fn get(&self, gateway_id: &str) -> Result<GatewayGroups, RepositoryError>;
    async fn update(&self, groups: &GatewayGroups) -> Result<(), RepositoryError>;
    async fn delete(&self, gateway_id: &str) -> Result<(), RepositoryError>;
    async fn exists(&self, gateway_id: &str) -> Result<bool, RepositoryError>;
}
