//! Compute resource service - registration of compute hosts and the
//! submission and data movement configurations they point at.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::{
    BatchQueue, CloudJobSubmission, ComputeResourceDescription, DataMovementInterface,
    FileSystems, GridFtpDataMovement, JobSubmissionInterface, LocalDataMovement, LocalSubmission,
    ResourceChildKey, ResourceJobManager, ScpDataMovement, SshJobSubmission, UnicoreDataMovement,
    UnicoreJobSubmission,
};
use crate::filter::{FilterTarget, parse_filters};
use crate::ids;
use crate::ports::{CatalogError, ComputeResourceRepository, InterfaceConfigRepository, found};

/// Service for compute resources.
///
/// Owns id generation for resources and interface configurations. Interface
/// tuples added to a resource must carry a configuration id, which is not
/// checked against the configuration tables. The configuration itself is
/// managed through the `*_submission` and `*_data_movement` methods and
/// survives removal of the tuple.
pub struct ComputeResourceService {
    resources: Arc<dyn ComputeResourceRepository>,
    configs: Arc<dyn InterfaceConfigRepository>,
}

impl ComputeResourceService {
    pub fn new(
        resources: Arc<dyn ComputeResourceRepository>,
        configs: Arc<dyn InterfaceConfigRepository>,
    ) -> Self {
        Self { resources, configs }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Compute resources
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a compute resource. Returns its id.
    pub async fn add_compute_resource(
        &self,
        mut resource: ComputeResourceDescription,
    ) -> Result<String, CatalogError> {
        resource.compute_resource_id =
            ids::generate_id(&resource.compute_resource_id, &resource.host_name);
        self.resources.insert(&resource).await?;
        info!(
            id = %resource.compute_resource_id,
            host = %resource.host_name,
            "Added compute resource"
        );
        Ok(resource.compute_resource_id)
    }

    pub async fn get_compute_resource(
        &self,
        id: &str,
    ) -> Result<Option<ComputeResourceDescription>, CatalogError> {
        debug!(id, "Fetching compute resource");
        found(self.resources.get(id).await)
    }

    /// Replace a compute resource and every collection it owns.
    #[instrument(skip(self, resource))]
    pub async fn update_compute_resource(
        &self,
        id: &str,
        mut resource: ComputeResourceDescription,
    ) -> Result<(), CatalogError> {
        resource.compute_resource_id = id.to_string();
        self.resources.update(&resource).await?;
        info!("Updated compute resource");
        Ok(())
    }

    pub async fn remove_compute_resource(&self, id: &str) -> Result<(), CatalogError> {
        self.resources.delete(id).await?;
        info!(id, "Removed compute resource");
        Ok(())
    }

    pub async fn is_compute_resource_exists(&self, id: &str) -> Result<bool, CatalogError> {
        Ok(self.resources.exists(id).await?)
    }

    pub async fn get_all_compute_resources(
        &self,
    ) -> Result<Vec<ComputeResourceDescription>, CatalogError> {
        Ok(self.resources.list().await?)
    }

    /// Resources matching every filter. Only `hostName` is accepted.
    pub async fn get_compute_resource_list(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<Vec<ComputeResourceDescription>, CatalogError> {
        let filters = parse_filters(FilterTarget::ComputeResource, filters)?;
        Ok(self.resources.filter(&filters).await?)
    }

    /// Map of resource id to host name.
    pub async fn get_all_compute_resource_ids(
        &self,
    ) -> Result<BTreeMap<String, String>, CatalogError> {
        Ok(self.resources.list_names(false).await?.into_iter().collect())
    }

    /// Map of resource id to host name, enabled resources only.
    pub async fn get_available_compute_resource_ids(
        &self,
    ) -> Result<BTreeMap<String, String>, CatalogError> {
        Ok(self.resources.list_names(true).await?.into_iter().collect())
    }

    /// File-system roots of a resource. Empty for an unknown id.
    pub async fn get_file_systems(
        &self,
        id: &str,
    ) -> Result<BTreeMap<FileSystems, String>, CatalogError> {
        Ok(self
            .get_compute_resource(id)
            .await?
            .map(|r| r.file_systems)
            .unwrap_or_default())
    }

    pub async fn get_batch_queue(
        &self,
        resource_id: &str,
        queue_name: &str,
    ) -> Result<Option<BatchQueue>, CatalogError> {
        Ok(self
            .get_compute_resource(resource_id)
            .await?
            .and_then(|r| r.batch_queue(queue_name).cloned()))
    }

    /// Remove one queue. The resource must exist; the queue need not.
    pub async fn remove_batch_queue(
        &self,
        resource_id: &str,
        queue_name: &str,
    ) -> Result<(), CatalogError> {
        let key = ResourceChildKey::new(resource_id, queue_name);
        self.resources.delete_batch_queue(&key).await?;
        info!(%key, "Removed batch queue");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Interface tuples
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach a job submission interface tuple. Returns the interface id.
    pub async fn add_job_submission_interface(
        &self,
        resource_id: &str,
        interface: JobSubmissionInterface,
    ) -> Result<String, CatalogError> {
        require_id(&interface.job_submission_interface_id, "job submission interface")?;
        self.resources
            .add_job_submission_interface(resource_id, &interface)
            .await?;
        Ok(interface.job_submission_interface_id)
    }

    /// Detach a job submission tuple. The configuration it points at stays.
    pub async fn remove_job_submission_interface(
        &self,
        resource_id: &str,
        interface_id: &str,
    ) -> Result<(), CatalogError> {
        let key = ResourceChildKey::new(resource_id, interface_id);
        Ok(self.resources.delete_job_submission_interface(&key).await?)
    }

    /// Attach a data movement interface tuple. Returns the interface id.
    pub async fn add_data_movement_interface(
        &self,
        resource_id: &str,
        interface: DataMovementInterface,
    ) -> Result<String, CatalogError> {
        require_id(&interface.data_movement_interface_id, "data movement interface")?;
        self.resources
            .add_data_movement_interface(resource_id, &interface)
            .await?;
        Ok(interface.data_movement_interface_id)
    }

    pub async fn remove_data_movement_interface(
        &self,
        resource_id: &str,
        interface_id: &str,
    ) -> Result<(), CatalogError> {
        let key = ResourceChildKey::new(resource_id, interface_id);
        Ok(self.resources.delete_data_movement_interface(&key).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resource job managers
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_resource_job_manager(
        &self,
        mut manager: ResourceJobManager,
    ) -> Result<String, CatalogError> {
        manager.resource_job_manager_id = ids::generate_id(&manager.resource_job_manager_id, "RJM");
        self.configs.insert_resource_job_manager(&manager).await?;
        info!(id = %manager.resource_job_manager_id, "Added resource job manager");
        Ok(manager.resource_job_manager_id)
    }

    pub async fn get_resource_job_manager(
        &self,
        id: &str,
    ) -> Result<Option<ResourceJobManager>, CatalogError> {
        found(self.configs.get_resource_job_manager(id).await)
    }

    pub async fn update_resource_job_manager(
        &self,
        id: &str,
        mut manager: ResourceJobManager,
    ) -> Result<(), CatalogError> {
        manager.resource_job_manager_id = id.to_string();
        Ok(self.configs.update_resource_job_manager(&manager).await?)
    }

    pub async fn delete_resource_job_manager(&self, id: &str) -> Result<(), CatalogError> {
        self.configs.delete_resource_job_manager(id).await?;
        info!(id, "Removed resource job manager");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Job submission configurations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_ssh_job_submission(
        &self,
        mut submission: SshJobSubmission,
    ) -> Result<String, CatalogError> {
        submission.job_submission_interface_id =
            ids::generate_id(&submission.job_submission_interface_id, "SSH");
        assign_manager_id(&mut submission.resource_job_manager);
        self.configs.insert_ssh_job_submission(&submission).await?;
        Ok(submission.job_submission_interface_id)
    }

    pub async fn get_ssh_job_submission(
        &self,
        id: &str,
    ) -> Result<Option<SshJobSubmission>, CatalogError> {
        found(self.configs.get_ssh_job_submission(id).await)
    }

    pub async fn update_ssh_job_submission(
        &self,
        id: &str,
        mut submission: SshJobSubmission,
    ) -> Result<(), CatalogError> {
        submission.job_submission_interface_id = id.to_string();
        if ids::is_unset(&submission.resource_job_manager.resource_job_manager_id) {
            let stored = self.configs.get_ssh_job_submission(id).await?;
            submission.resource_job_manager.resource_job_manager_id =
                stored.resource_job_manager.resource_job_manager_id;
        }
        Ok(self.configs.update_ssh_job_submission(&submission).await?)
    }

    pub async fn add_local_submission(
        &self,
        mut submission: LocalSubmission,
    ) -> Result<String, CatalogError> {
        submission.job_submission_interface_id =
            ids::generate_id(&submission.job_submission_interface_id, "LOCAL");
        assign_manager_id(&mut submission.resource_job_manager);
        self.configs.insert_local_submission(&submission).await?;
        Ok(submission.job_submission_interface_id)
    }

    pub async fn get_local_submission(
        &self,
        id: &str,
    ) -> Result<Option<LocalSubmission>, CatalogError> {
        found(self.configs.get_local_submission(id).await)
    }

    pub async fn update_local_submission(
        &self,
        id: &str,
        mut submission: LocalSubmission,
    ) -> Result<(), CatalogError> {
        submission.job_submission_interface_id = id.to_string();
        if ids::is_unset(&submission.resource_job_manager.resource_job_manager_id) {
            let stored = self.configs.get_local_submission(id).await?;
            submission.resource_job_manager.resource_job_manager_id =
                stored.resource_job_manager.resource_job_manager_id;
        }
        Ok(self.configs.update_local_submission(&submission).await?)
    }

    pub async fn add_cloud_job_submission(
        &self,
        mut submission: CloudJobSubmission,
    ) -> Result<String, CatalogError> {
        submission.job_submission_interface_id =
            ids::generate_id(&submission.job_submission_interface_id, "Cloud");
        self.configs.insert_cloud_job_submission(&submission).await?;
        Ok(submission.job_submission_interface_id)
    }

    pub async fn get_cloud_job_submission(
        &self,
        id: &str,
    ) -> Result<Option<CloudJobSubmission>, CatalogError> {
        found(self.configs.get_cloud_job_submission(id).await)
    }

    pub async fn update_cloud_job_submission(
        &self,
        id: &str,
        mut submission: CloudJobSubmission,
    ) -> Result<(), CatalogError> {
        submission.job_submission_interface_id = id.to_string();
        Ok(self.configs.update_cloud_job_submission(&submission).await?)
    }

    pub async fn add_unicore_job_submission(
        &self,
        mut submission: UnicoreJobSubmission,
    ) -> Result<String, CatalogError> {
        submission.job_submission_interface_id =
            ids::generate_id(&submission.job_submission_interface_id, "UNICORE");
        self.configs.insert_unicore_job_submission(&submission).await?;
        Ok(submission.job_submission_interface_id)
    }

    pub async fn get_unicore_job_submission(
        &self,
        id: &str,
    ) -> Result<Option<UnicoreJobSubmission>, CatalogError> {
        found(self.configs.get_unicore_job_submission(id).await)
    }

    pub async fn update_unicore_job_submission(
        &self,
        id: &str,
        mut submission: UnicoreJobSubmission,
    ) -> Result<(), CatalogError> {
        submission.job_submission_interface_id = id.to_string();
        Ok(self.configs.update_unicore_job_submission(&submission).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Data movement configurations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_scp_data_movement(
        &self,
        mut movement: ScpDataMovement,
    ) -> Result<String, CatalogError> {
        movement.data_movement_interface_id =
            ids::generate_id(&movement.data_movement_interface_id, "SCP");
        self.configs.insert_scp_data_movement(&movement).await?;
        Ok(movement.data_movement_interface_id)
    }

    pub async fn get_scp_data_movement(
        &self,
        id: &str,
    ) -> Result<Option<ScpDataMovement>, CatalogError> {
        found(self.configs.get_scp_data_movement(id).await)
    }

    pub async fn update_scp_data_movement(
        &self,
        id: &str,
        mut movement: ScpDataMovement,
    ) -> Result<(), CatalogError> {
        movement.data_movement_interface_id = id.to_string();
        Ok(self.configs.update_scp_data_movement(&movement).await?)
    }

    pub async fn add_grid_ftp_data_movement(
        &self,
        mut movement: GridFtpDataMovement,
    ) -> Result<String, CatalogError> {
        movement.data_movement_interface_id =
            ids::generate_id(&movement.data_movement_interface_id, "GRIDFTP");
        self.configs.insert_grid_ftp_data_movement(&movement).await?;
        Ok(movement.data_movement_interface_id)
    }

    pub async fn get_grid_ftp_data_movement(
        &self,
        id: &str,
    ) -> Result<Option<GridFtpDataMovement>, CatalogError> {
        found(self.configs.get_grid_ftp_data_movement(id).await)
    }

    pub async fn update_grid_ftp_data_movement(
        &self,
        id: &str,
        mut movement: GridFtpDataMovement,
    ) -> Result<(), CatalogError> {
        movement.data_movement_interface_id = id.to_string();
        Ok(self.configs.update_grid_ftp_data_movement(&movement).await?)
    }

    pub async fn add_unicore_data_movement(
        &self,
        mut movement: UnicoreDataMovement,
    ) -> Result<String, CatalogError> {
        movement.data_movement_interface_id =
            ids::generate_id(&movement.data_movement_interface_id, "UNICORE");
        self.configs.insert_unicore_data_movement(&movement).await?;
        Ok(movement.data_movement_interface_id)
    }

    pub async fn get_unicore_data_movement(
        &self,
        id: &str,
    ) -> Result<Option<UnicoreDataMovement>, CatalogError> {
        found(self.configs.get_unicore_data_movement(id).await)
    }

    pub async fn update_unicore_data_movement(
        &self,
        id: &str,
        mut movement: UnicoreDataMovement,
    ) -> Result<(), CatalogError> {
        movement.data_movement_interface_id = id.to_string();
        Ok(self.configs.update_unicore_data_movement(&movement).await?)
    }

    pub async fn add_local_data_movement(
        &self,
        mut movement: LocalDataMovement,
    ) -> Result<String, CatalogError> {
        movement.data_movement_interface_id =
            ids::generate_id(&movement.data_movement_interface_id, "LOCAL");
        self.configs.insert_local_data_movement(&movement).await?;
        Ok(movement.data_movement_interface_id)
    }

    pub async fn get_local_data_movement(
        &self,
        id: &str,
    ) -> Result<Option<LocalDataMovement>, CatalogError> {
        found(self.configs.get_local_data_movement(id).await)
    }

    pub async fn update_local_data_movement(
        &self,
        id: &str,
        mut movement: LocalDataMovement,
    ) -> Result<(), CatalogError> {
        movement.data_movement_interface_id = id.to_string();
        Ok(self.configs.update_local_data_movement(&movement).await?)
    }
}

fn assign_manager_id(manager: &mut ResourceJobManager) {
    manager.resource_job_manager_id = ids::generate_id(&manager.resource_job_manager_id, "RJM");
}

fn require_id(id: &str, what: &str) -> Result<(), CatalogError> {
    if ids::is_unset(id) {
        return Err(CatalogError::InvalidInput(format!("{what} id is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RepositoryError;
    use crate::ports::compute_repository::MockComputeResourceRepository;
    use async_trait::async_trait;

    struct UnusedConfigs;

    #[async_trait]
    impl InterfaceConfigRepository for UnusedConfigs {
        async fn insert_resource_job_manager(
            &self,
            _manager: &ResourceJobManager,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_resource_job_manager(
            &self,
            id: &str,
        ) -> Result<ResourceJobManager, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_resource_job_manager(
            &self,
            _manager: &ResourceJobManager,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_resource_job_manager(&self, _id: &str) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn insert_ssh_job_submission(
            &self,
            _submission: &SshJobSubmission,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_ssh_job_submission(
            &self,
            id: &str,
        ) -> Result<SshJobSubmission, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_ssh_job_submission(
            &self,
            _submission: &SshJobSubmission,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn insert_local_submission(
            &self,
            _submission: &LocalSubmission,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_local_submission(&self, id: &str) -> Result<LocalSubmission, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_local_submission(
            &self,
            _submission: &LocalSubmission,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn insert_cloud_job_submission(
            &self,
            _submission: &CloudJobSubmission,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_cloud_job_submission(
            &self,
            id: &str,
        ) -> Result<CloudJobSubmission, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_cloud_job_submission(
            &self,
            _submission: &CloudJobSubmission,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn insert_unicore_job_submission(
            &self,
            _submission: &UnicoreJobSubmission,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_unicore_job_submission(
            &self,
            id: &str,
        ) -> Result<UnicoreJobSubmission, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_unicore_job_submission(
            &self,
            _submission: &UnicoreJobSubmission,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn insert_unicore_data_movement(
            &self,
            _movement: &UnicoreDataMovement,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_unicore_data_movement(
            &self,
            id: &str,
        ) -> Result<UnicoreDataMovement, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_unicore_data_movement(
            &self,
            _movement: &UnicoreDataMovement,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn insert_scp_data_movement(
            &self,
            _movement: &ScpDataMovement,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_scp_data_movement(
            &self,
            id: &str,
        ) -> Result<ScpDataMovement, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_scp_data_movement(
            &self,
            _movement: &ScpDataMovement,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn insert_grid_ftp_data_movement(
            &self,
            _movement: &GridFtpDataMovement,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_grid_ftp_data_movement(
            &self,
            id: &str,
        ) -> Result<GridFtpDataMovement, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_grid_ftp_data_movement(
            &self,
            _movement: &GridFtpDataMovement,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn insert_local_data_movement(
            &self,
            _movement: &LocalDataMovement,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_local_data_movement(
            &self,
            id: &str,
        ) -> Result<LocalDataMovement, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn update_local_data_movement(
            &self,
            _movement: &LocalDataMovement,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
    }

    fn service(repo: MockComputeResourceRepository) -> ComputeResourceService {
        ComputeResourceService::new(Arc::new(repo), Arc::new(UnusedConfigs))
    }

    #[tokio::test]
    async fn test_add_generates_id_from_host_name() {
        let mut repo = MockComputeResourceRepository::new();
        repo.expect_insert()
            .withf(|r| r.compute_resource_id.starts_with("localhost_"))
            .times(1)
            .returning(|_| Ok(()));

        let id = service(repo)
            .add_compute_resource(ComputeResourceDescription {
                host_name: "localhost".to_string(),
                ..ComputeResourceDescription::default()
            })
            .await
            .unwrap();

        assert!(id.starts_with("localhost_"));
    }

    #[tokio::test]
    async fn test_get_maps_not_found_to_none() {
        let mut repo = MockComputeResourceRepository::new();
        repo.expect_get()
            .returning(|id| Err(RepositoryError::NotFound(id.to_string())));

        let result = service(repo).get_compute_resource("missing").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_of_missing_resource_is_not_found() {
        let mut repo = MockComputeResourceRepository::new();
        repo.expect_update()
            .returning(|r| Err(RepositoryError::NotFound(r.compute_resource_id.clone())));

        let err = service(repo)
            .update_compute_resource("missing", ComputeResourceDescription::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_filter_rejects_unknown_key_before_querying() {
        let repo = MockComputeResourceRepository::new();
        let filters = BTreeMap::from([("NotAValidName".to_string(), "x".to_string())]);

        let err = service(repo)
            .get_compute_resource_list(&filters)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_file_systems_of_unknown_resource_are_empty() {
        let mut repo = MockComputeResourceRepository::new();
        repo.expect_get()
            .returning(|id| Err(RepositoryError::NotFound(id.to_string())));

        let roots = service(repo).get_file_systems("nope").await.unwrap();
        assert!(roots.is_empty());
    }

    #[tokio::test]
    async fn test_interface_tuple_requires_an_id() {
        let repo = MockComputeResourceRepository::new();

        let err = service(repo)
            .add_job_submission_interface("c1", JobSubmissionInterface::default())
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_unknown_ssh_submission_is_none() {
        let repo = MockComputeResourceRepository::new();
        let result = service(repo).get_ssh_job_submission("SSH_x").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_of_unknown_submission_without_manager_id_is_not_found() {
        let repo = MockComputeResourceRepository::new();

        let err = service(repo)
            .update_ssh_job_submission("SSH_x", SshJobSubmission::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_unicore_configs_are_none() {
        let service = service(MockComputeResourceRepository::new());

        assert!(service.get_unicore_job_submission("UNICORE_x").await.unwrap().is_none());
        assert!(service.get_unicore_data_movement("UNICORE_y").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_failures_are_not_swallowed() {
        let mut repo = MockComputeResourceRepository::new();
        repo.expect_list()
            .returning(|| Err(RepositoryError::Storage("disk I/O error".to_string())));

        let err = service(repo).get_all_compute_resources().await.unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
    }
}
