//! Application deployment service.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::ApplicationDeploymentDescription;
use crate::filter::{FilterTarget, parse_filters};
use crate::ids;
use crate::ports::{ApplicationDeploymentRepository, CatalogError, found};

/// Service for application deployments.
///
/// A deployment names a module and a compute host by id. Neither reference
/// is checked or owned here.
pub struct ApplicationDeploymentService {
    deployments: Arc<dyn ApplicationDeploymentRepository>,
}

impl ApplicationDeploymentService {
    pub fn new(deployments: Arc<dyn ApplicationDeploymentRepository>) -> Self {
        Self { deployments }
    }

    /// Register a deployment. The generated id is derived from the host id.
    pub async fn add_application_deployment(
        &self,
        mut deployment: ApplicationDeploymentDescription,
        gateway_id: &str,
    ) -> Result<String, CatalogError> {
        deployment.app_deployment_id =
            ids::generate_id(&deployment.app_deployment_id, &deployment.compute_host_id);
        self.deployments.insert(&deployment, gateway_id).await?;
        info!(
            id = %deployment.app_deployment_id,
            module = %deployment.app_module_id,
            host = %deployment.compute_host_id,
            "Added application deployment"
        );
        Ok(deployment.app_deployment_id)
    }

    pub async fn get_application_deployment(
        &self,
        id: &str,
    ) -> Result<Option<ApplicationDeploymentDescription>, CatalogError> {
        found(self.deployments.get(id).await)
    }

    pub async fn update_application_deployment(
        &self,
        id: &str,
        mut deployment: ApplicationDeploymentDescription,
    ) -> Result<(), CatalogError> {
        deployment.app_deployment_id = id.to_string();
        Ok(self.deployments.update(&deployment).await?)
    }

    pub async fn remove_application_deployment(&self, id: &str) -> Result<(), CatalogError> {
        self.deployments.delete(id).await?;
        info!(id, "Removed application deployment");
        Ok(())
    }

    pub async fn is_application_deployment_exists(&self, id: &str) -> Result<bool, CatalogError> {
        Ok(self.deployments.exists(id).await?)
    }

    /// Deployments matching every filter. `appModuleId` and `computeHostId`
    /// are accepted.
    pub async fn get_application_deployments(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<Vec<ApplicationDeploymentDescription>, CatalogError> {
        let filters = parse_filters(FilterTarget::ApplicationDeployment, filters)?;
        Ok(self.deployments.filter(&filters).await?)
    }

    pub async fn get_all_application_deployments(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<ApplicationDeploymentDescription>, CatalogError> {
        Ok(self.deployments.list(gateway_id).await?)
    }

    pub async fn get_all_application_deployment_ids(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.deployments.list_ids().await?)
    }

    pub async fn get_accessible_application_deployments(
        &self,
        gateway_id: &str,
        deployment_ids: &[String],
        compute_host_ids: &[String],
    ) -> Result<Vec<ApplicationDeploymentDescription>, CatalogError> {
        if deployment_ids.is_empty() || compute_host_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .deployments
            .list_accessible(gateway_id, deployment_ids, compute_host_ids)
            .await?)
    }
}
