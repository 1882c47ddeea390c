//! Group resource profile repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{
    BatchQueueResourcePolicy, ComputeResourcePolicy, GroupComputeResourcePreference,
    GroupResourceProfile,
};

/// Repository for group resource profiles.
///
/// # Design Rules
///
/// - Every id, including policy and reservation ids, is assigned before the
///   profile reaches the repository
/// - `update` never writes the stored creation time
/// - `update` diffs compute preferences, compute policies and batch queue
///   policies one collection at a time inside a single unit of work:
///   orphans are deleted, surviving keys are rewritten in place (clearing
///   optional fields set to `None`), new keys are inserted
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupProfileRepository: Send + Sync {
    async fn insert(&self, profile: &GroupResourceProfile) -> Result<(), RepositoryError>;
    async fn get(&self, id: &str) -> Result<GroupResourceProfile, RepositoryError>;
    async fn update(&self, profile: &GroupResourceProfile) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    async fn exists(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Profiles of `gateway_id` whose id is in `accessible_ids`.
    async fn list(
        &self,
        gateway_id: &str,
        accessible_ids: &[String],
    ) -> Result<Vec<GroupResourceProfile>, RepositoryError>;

    async fn get_compute_preference(
        &self,
        compute_resource_id: &str,
        group_profile_id: &str,
    ) -> Result<GroupComputeResourcePreference, RepositoryError>;
    async fn delete_compute_preference(
        &self,
        compute_resource_id: &str,
        group_profile_id: &str,
    ) -> Result<(), RepositoryError>;
    async fn list_compute_preferences(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<GroupComputeResourcePreference>, RepositoryError>;

    async fn get_compute_policy(
        &self,
        policy_id: &str,
    ) -> Result<ComputeResourcePolicy, RepositoryError>;
    async fn delete_compute_policy(&self, policy_id: &str) -> Result<(), RepositoryError>;
    async fn list_compute_policies(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<ComputeResourcePolicy>, RepositoryError>;

    async fn get_batch_queue_policy(
        &self,
        policy_id: &str,
    ) -> Result<BatchQueueResourcePolicy, RepositoryError>;
    async fn delete_batch_queue_policy(&self, policy_id: &str) -> Result<(), RepositoryError>;
    async fn list_batch_queue_policies(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<BatchQueueResourcePolicy>, RepositoryError>;
}
