//! Catalog services.
//!
//! One service per aggregate root. Services own id generation, filter
//! validation and the `Option`/error shaping callers depend on; storage is
//! reached only through the ports.

mod application;
mod catalog;
mod compute_resource;
mod deployment;
mod gateway_groups;
mod gateway_profile;
mod group_profile;
mod storage_resource;
mod user_profile;

pub use application::ApplicationInterfaceService;
pub use catalog::Catalog;
pub use compute_resource::ComputeResourceService;
pub use deployment::ApplicationDeploymentService;
pub use gateway_groups::GatewayGroupsService;
pub use gateway_profile::GwyResourceProfileService;
pub use group_profile::GroupResourceProfileService;
pub use storage_resource::StorageResourceService;
pub use user_profile::UserResourceProfileService;
