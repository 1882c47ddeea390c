//! Compute resource repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{
    ComputeResourceDescription, DataMovementInterface, JobSubmissionInterface, ResourceChildKey,
};
use crate::filter::FieldFilter;

/// Repository for compute resources and the rows they own.
///
/// # Design Rules
///
/// - The resource id is always set by the caller; id generation belongs in
///   `ComputeResourceService`
/// - `update` replaces batch queues, interfaces, file systems, aliases and
///   addresses wholesale; stored rows missing from the new value are deleted
/// - `delete` cascades to owned rows only, never to the submission or
///   movement configurations the interface tuples point at
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComputeResourceRepository: Send + Sync {
    /// Returns `Err(RepositoryError::AlreadyExists)` if the id is taken.
    async fn insert(&self, resource: &ComputeResourceDescription) -> Result<(), RepositoryError>;

    /// Returns `Err(RepositoryError::NotFound)` if the resource doesn't exist.
    async fn get(&self, id: &str) -> Result<ComputeResourceDescription, RepositoryError>;

    /// Returns `Err(RepositoryError::NotFound)` if the resource doesn't exist.
    async fn update(&self, resource: &ComputeResourceDescription) -> Result<(), RepositoryError>;

    /// Returns `Err(RepositoryError::NotFound)` if the resource doesn't exist.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    async fn exists(&self, id: &str) -> Result<bool, RepositoryError>;

    /// All resources in insertion order.
    async fn list(&self) -> Result<Vec<ComputeResourceDescription>, RepositoryError>;

    /// Resources matching every filter.
    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<ComputeResourceDescription>, RepositoryError>;

    /// `(id, host name)` pairs in insertion order.
    async fn list_names(&self, enabled_only: bool) -> Result<Vec<(String, String)>, RepositoryError>;

    /// Delete one queue. A missing queue is not an error; a missing
    /// resource is `NotFound`.
    async fn delete_batch_queue(&self, key: &ResourceChildKey) -> Result<(), RepositoryError>;

    /// Returns `Err(RepositoryError::AlreadyExists)` if the resource already
    /// lists this interface id.
    async fn add_job_submission_interface(
        &self,
        resource_id: &str,
        interface: &JobSubmissionInterface,
    ) -> Result<(), RepositoryError>;

    async fn delete_job_submission_interface(
        &self,
        key: &ResourceChildKey,
    ) -> Result<(), RepositoryError>;

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
