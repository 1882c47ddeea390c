//! Application module, interface and deployment repositories.
//!
//! All three are scoped to a gateway on insert. Cross references between
//! them (interface to module, deployment to module and host) are plain ids:
//! removing one entity never removes the others.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{
    ApplicationDeploymentDescription, ApplicationInterfaceDescription, ApplicationModule,
};
use crate::filter::FieldFilter;

#[async_trait]
pub trait ApplicationModuleRepository: Send + Sync {
    /// Returns `Err(RepositoryError::AlreadyExists)` if the id is taken.
    async fn insert(&self, module: &ApplicationModule, gateway_id: &str)
    -> Result<(), RepositoryError>;
    async fn get(&self, id: &str) -> Result<ApplicationModule, RepositoryError>;
    async fn update(&self, module: &ApplicationModule) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    async fn list(&self, gateway_id: &str) -> Result<Vec<ApplicationModule>, RepositoryError>;
    async fn filter(&self, filters: &[FieldFilter])
    -> Result<Vec<ApplicationModule>, RepositoryError>;

    /// Distinct modules of `gateway_id` with at least one deployment whose
    /// id is in `deployment_ids` and whose host is in `compute_host_ids`.
    async fn list_accessible(
        &self,
        gateway_id: &str,
        deployment_ids: &[String],
        compute_host_ids: &[String],
    ) -> Result<Vec<ApplicationModule>, RepositoryError>;
}

/// Repository for application interfaces.
///
/// # Design Rules
///
/// - Inputs, outputs and module ids are stored in the order supplied
/// - `update` replaces all three collections
#[async_trait]
pub trait ApplicationInterfaceRepository: Send + Sync {
    async fn insert(
        &self,
        interface: &ApplicationInterfaceDescription,
        gateway_id: &str,
    ) -> Result<(), RepositoryError>;
    async fn get(&self, id: &str) -> Result<ApplicationInterfaceDescription, RepositoryError>;
    async fn update(&self, interface: &ApplicationInterfaceDescription)
    -> Result<(), RepositoryError>;
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    async fn list(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<ApplicationInterfaceDescription>, RepositoryError>;
    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<ApplicationInterfaceDescription>, RepositoryError>;
    async fn list_ids(&self) -> Result<Vec<String>, RepositoryError>;

    /// Append `module_id` to the interface's module list.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if the interface doesn't exist.
    async fn add_module_mapping(
        &self,
        interface_id: &str,
        module_id: &str,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ApplicationDeploymentRepository: Send + Sync {
    async fn insert(
        &self,
        deployment: &ApplicationDeploymentDescription,
        gateway_id: &str,
    ) -> Result<(), RepositoryError>;
    async fn get(&self, id: &str) -> Result<ApplicationDeploymentDescription, RepositoryError>;
    async fn update(
        &self,
        deployment: &ApplicationDeploymentDescription,
    ) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    async fn exists(&self, id: &str) -> Result<bool, RepositoryError>;
    async fn list(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<ApplicationDeploymentDescription>, RepositoryError>;
    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<ApplicationDeploymentDescription>, RepositoryError>;
    async fn list_ids(&self) -> Result<Vec<String>, RepositoryError>;

    /// Deployments of `gateway_id` whose id is in `deployment_ids` and whose
    /// host is in `compute_host_ids`.
    async fn list_accessible(
        &self,
        gateway_id: &str,
        deployment_ids: &[String],
        compute_host_ids: &[String],
    ) -> Result<Vec<ApplicationDeploymentDescription>, RepositoryError>;
}
