//! Storage resource repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{DataMovementInterface, ResourceChildKey, StorageResourceDescription};
use crate::filter::FieldFilter;

/// Repository for storage resources and their interface tuples.
///
/// Same contract as `ComputeResourceRepository`, minus queues.
#[async_trait]
pub trait StorageResourceRepository: Send + Sync {
    async fn insert(&self, resource: &StorageResourceDescription) -> Result<(), RepositoryError>;
    async fn get(&self, id: &str) -> Result<StorageResourceDescription, RepositoryError>;
    async fn update(&self, resource: &StorageResourceDescription) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    async fn exists(&self, id: &str) -> Result<bool, RepositoryError>;
    async fn list(&self) -> Result<Vec<StorageResourceDescription>, RepositoryError>;
    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<StorageResourceDescription>, RepositoryError>;
    async fn list_names(&self, enabled_only: bool) -> Result<Vec<(String, String)>, RepositoryError>;
    async fn add_data_movement_interface(
        &self,
        resource_id: &str,
        interface: &DataMovementInterface,
    ) -> Result<(), RepositoryError>;
    async fn delete_data_movement_interface(
        &self,
        key: &ResourceChildKey,
    ) -> Result<(), RepositoryError>;
}
