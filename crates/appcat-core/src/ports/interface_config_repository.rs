//! Submission and data movement configuration repository.
//!
//! These configurations have their own id space. Compute and storage
//! resources point at them through interface tuples but never own them.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{
    CloudJobSubmission, GridFtpDataMovement, LocalDataMovement, LocalSubmission,
    ResourceJobManager, ScpDataMovement, SshJobSubmission, UnicoreDataMovement,
    UnicoreJobSubmission,
};

/// Repository for independently addressable interface configurations.
///
/// # Design Rules
///
/// - Submissions that embed a `ResourceJobManager` store it in the same unit
///   of work, inserting or replacing it by its id
/// - An update that points a submission at a different manager deletes the
///   old one once no submission references it
/// - `get_*` returns `Err(RepositoryError::NotFound)` when absent
/// - `update_*` returns `Err(RepositoryError::NotFound)` when absent
#[async_trait]
pub trait InterfaceConfigRepository: Send + Sync {
    async fn insert_resource_job_manager(
        &self,
        manager: &ResourceJobManager,
    ) -> Result<(), RepositoryError>;
    async fn get_resource_job_manager(&self, id: &str)
    -> Result<ResourceJobManager, RepositoryError>;
    async fn update_resource_job_manager(
        &self,
        manager: &ResourceJobManager,
    ) -> Result<(), RepositoryError>;
    async fn delete_resource_job_manager(&self, id: &str) -> Result<(), RepositoryError>;

    async fn insert_ssh_job_submission(
        &self,
        submission: &SshJobSubmission,
    ) -> Result<(), RepositoryError>;
    async fn get_ssh_job_submission(&self, id: &str) -> Result<SshJobSubmission, RepositoryError>;
    async fn update_ssh_job_submission(
        &self,
        submission: &SshJobSubmission,
    ) -> Result<(), RepositoryError>;

    async fn insert_local_submission(
        &self,
        submission: &LocalSubmission,
    ) -> Result<(), RepositoryError>;
    async fn get_local_submission(&self, id: &str) -> Result<LocalSubmission, RepositoryError>;
    async fn update_local_submission(
        &self,
        submission: &LocalSubmission,
    ) -> Result<(), RepositoryError>;

    async fn insert_cloud_job_submission(
        &self,
        submission: &CloudJobSubmission,
    ) -> Result<(), RepositoryError>;
    async fn get_cloud_job_submission(
        &self,
        id: &str,
    ) -> Result<CloudJobSubmission, RepositoryError>;
    async fn update_cloud_job_submission(
        &self,
        submission: &CloudJobSubmission,
    ) -> Result<(), RepositoryError>;

    async fn insert_unicore_job_submission(
        &self,
        submission: &UnicoreJobSubmission,
    ) -> Result<(), RepositoryError>;
    async fn get_unicore_job_submission(
        &self,
        id: &str,
    ) -> Result<UnicoreJobSubmission, RepositoryError>;
    async fn update_unicore_job_submission(
        &self,
        submission: &UnicoreJobSubmission,
    ) -> Result<(), RepositoryError>;

    async fn insert_scp_data_movement(
        &self,
        movement: &ScpDataMovement,
    ) -> Result<(), RepositoryError>;
    async fn get_scp_data_movement(&self, id: &str) -> Result<ScpDataMovement, RepositoryError>;
    async fn update_scp_data_movement(
        &self,
        movement: &ScpDataMovement,
    ) -> Result<(), RepositoryError>;

    async fn insert_grid_ftp_data_movement(
        &self,
        movement: &GridFtpDataMovement,
    ) -> Result<(), RepositoryError>;
    async fn get_grid_ftp_data_movement(
        &self,
        id: &str,
    ) -> Result<GridFtpDataMovement, RepositoryError>;
    async fn update_grid_ftp_data_movement(
        &self,
        movement: &GridFtpDataMovement,
    ) -> Result<(), RepositoryError>;

    async fn insert_unicore_data_movement(
        &self,
        movement: &UnicoreDataMovement,
    ) -> Result<(), RepositoryError>;
    async fn get_unicore_data_movement(
        &self,
        id: &str,
    ) -> Result<UnicoreDataMovement, RepositoryError>;
    async fn update_unicore_data_movement(
        &self,
        movement: &UnicoreDataMovement,
    ) -> Result<(), RepositoryError>;

    async fn insert_local_data_movement(
        &self,
        movement: &LocalDataMovement,
    ) -> Result<(), RepositoryError>;
    async fn get_local_data_movement(&self, id: &str)
    -> Result<LocalDataMovement, RepositoryError>;
    async fn update_local_data_movement(
        &self,
        movement: &LocalDataMovement,
    ) -> Result<(), RepositoryError>;
}
