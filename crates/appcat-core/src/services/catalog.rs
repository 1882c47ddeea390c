//! `Catalog` - the application catalog facade.
//!
//! This is the composition root for catalog services. Adapters receive a
//! `Catalog` and use it to reach every service.

use crate::ports::Repos;

use super::{
    ApplicationDeploymentService, ApplicationInterfaceService, ComputeResourceService,
    GatewayGroupsService, GroupResourceProfileService, GwyResourceProfileService,
    StorageResourceService, UserResourceProfileService,
};

/// The catalog facade.
///
/// Constructed once at the adapter's composition root with concrete
/// repositories; every service shares the same store.
///
/// ```ignore
/// let repos = CatalogFactory::build_repos(pool);
/// let catalog = Catalog::new(repos);
///
/// let hosts = catalog.compute().get_all_compute_resources().await?;
/// ```
pub struct Catalog {
    compute: ComputeResourceService,
    applications: ApplicationInterfaceService,
    deployments: ApplicationDeploymentService,
    storage: StorageResourceService,
    gateway_profiles: GwyResourceProfileService,
    group_profiles: GroupResourceProfileService,
    user_profiles: UserResourceProfileService,
    gateway_groups: GatewayGroupsService,
}

impl Catalog {
    pub fn new(repos: Repos) -> Self {
        Self {
            compute: ComputeResourceService::new(repos.compute_resources, repos.interface_configs),
            applications: ApplicationInterfaceService::new(repos.app_modules, repos.app_interfaces),
            deployments: ApplicationDeploymentService::new(repos.app_deployments),
            storage: StorageResourceService::new(repos.storage_resources),
            gateway_profiles: GwyResourceProfileService::new(repos.gateway_profiles),
            group_profiles: GroupResourceProfileService::new(repos.group_profiles),
            user_profiles: UserResourceProfileService::new(repos.user_profiles),
            gateway_groups: GatewayGroupsService::new(repos.gateway_groups),
        }
    }

    pub const fn compute(&self) -> &ComputeResourceService {
        &self.compute
    }

    /// Modules and interfaces.
    pub const fn applications(&self) -> &ApplicationInterfaceService {
        &self.applications
    }

    pub const fn deployments(&self) -> &ApplicationDeploymentService {
        &self.deployments
    }

    pub const fn storage(&self) -> &StorageResourceService {
        &self.storage
    }

    pub const fn gateway_profiles(&self) -> &GwyResourceProfileService {
        &self.gateway_profiles
    }

    pub const fn group_profiles(&self) -> &GroupResourceProfileService {
        &self.group_profiles
    }

    pub const fn user_profiles(&self) -> &UserResourceProfileService {
        &self.user_profiles
    }

    pub const fn gateway_groups(&self) -> &GatewayGroupsService {
        &self.gateway_groups
    }
}
