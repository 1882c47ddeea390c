//! Repository implementations using `SQLite`.
//!
//! These implementations encapsulate all SQL queries and database access.
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

mod row_mappers;
mod sqlite_compute_repository;
mod sqlite_deployment_repository;
mod sqlite_gateway_groups_repository;
mod sqlite_gateway_profile_repository;
mod sqlite_group_profile_repository;
mod sqlite_interface_config_repository;
mod sqlite_interface_repository;
mod sqlite_module_repository;
mod sqlite_storage_repository;
mod sqlite_user_profile_repository;

pub use sqlite_compute_repository::SqliteComputeResourceRepository;
pub use sqlite_deployment_repository::SqliteDeploymentRepository;
pub use sqlite_gateway_groups_repository::SqliteGatewayGroupsRepository;
pub use sqlite_gateway_profile_repository::SqliteGatewayProfileRepository;
pub use sqlite_group_profile_repository::SqliteGroupProfileRepository;
pub use sqlite_interface_config_repository::SqliteInterfaceConfigRepository;
pub use sqlite_interface_repository::SqliteInterfaceRepository;
pub use sqlite_module_repository::SqliteModuleRepository;
pub use sqlite_storage_repository::SqliteStorageResourceRepository;
pub use sqlite_user_profile_repository::SqliteUserProfileRepository;
