//! Shared setup and fixtures for catalog integration tests.

#![allow(dead_code)]

use appcat_core::domain::{
    ApplicationDeploymentDescription, ApplicationModule, ApplicationParallelismType, BatchQueue,
    ComputeResourceDescription, GatewayResourceProfile,
};
use appcat_core::{Catalog, CatalogConfig};
use appcat_db::{CatalogFactory, setup_database};
use sqlx::SqlitePool;

/// A catalog over a fresh in-memory database.
pub async fn catalog() -> Catalog {
    let pool = setup_database(&CatalogConfig::in_memory())
        .await
        .expect("in-memory database");
    CatalogFactory::build_catalog(pool)
}

/// Like [`catalog`], also handing back the pool for direct row checks.
pub async fn catalog_with_pool() -> (Catalog, SqlitePool) {
    let pool = setup_database(&CatalogConfig::in_memory())
        .await
        .expect("in-memory database");
    (CatalogFactory::build_catalog(pool.clone()), pool)
}

pub fn default_gateway() -> String {
    CatalogConfig::in_memory().default_gateway_id
}

/// A compute resource on `host` with queues `q0..q{queue_count}`.
pub fn prepare_compute_resource(host: &str, queue_count: usize) -> ComputeResourceDescription {
    ComputeResourceDescription {
        host_name: host.to_string(),
        host_aliases: vec![format!("alias.{host}")],
        ip_addresses: vec!["10.0.0.1".to_string()],
        resource_description: Some(format!("{host} cluster")),
        enabled: true,
        batch_queues: (0..queue_count)
            .map(|i| BatchQueue {
                queue_name: format!("q{i}"),
                max_nodes: Some(16),
                ..BatchQueue::default()
            })
            .collect(),
        cpus_per_node: Some(24),
        ..ComputeResourceDescription::default()
    }
}

pub fn module(name: &str) -> ApplicationModule {
    ApplicationModule {
        app_module_name: name.to_string(),
        app_module_version: Some("2024.1".to_string()),
        ..ApplicationModule::default()
    }
}

pub fn deployment(module_id: &str, host_id: &str) -> ApplicationDeploymentDescription {
    ApplicationDeploymentDescription {
        app_module_id: module_id.to_string(),
        compute_host_id: host_id.to_string(),
        executable_path: "/opt/bin/run".to_string(),
        parallelism: ApplicationParallelismType::Serial,
        ..ApplicationDeploymentDescription::default()
    }
}

pub fn gateway_profile(gateway_id: &str) -> GatewayResourceProfile {
    GatewayResourceProfile {
        credential_store_token: Some(format!("{gateway_id}-token")),
        ..GatewayResourceProfile::new(gateway_id)
    }
}
