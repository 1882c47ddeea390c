//! Storage resource service.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::{DataMovementInterface, ResourceChildKey, StorageResourceDescription};
use crate::filter::{FilterTarget, parse_filters};
use crate::ids;
use crate::ports::{CatalogError, StorageResourceRepository, found};

pub struct StorageResourceService {
    resources: Arc<dyn StorageResourceRepository>,
}

impl StorageResourceService {
    pub fn new(resources: Arc<dyn StorageResourceRepository>) -> Self {
        Self { resources }
    }

    pub async fn add_storage_resource(
        &self,
        mut resource: StorageResourceDescription,
    ) -> Result<String, CatalogError> {
        resource.storage_resource_id =
            ids::generate_id(&resource.storage_resource_id, &resource.host_name);
        self.resources.insert(&resource).await?;
        info!(id = %resource.storage_resource_id, "Added storage resource");
        Ok(resource.storage_resource_id)
    }

    pub async fn get_storage_resource(
        &self,
        id: &str,
    ) -> Result<Option<StorageResourceDescription>, CatalogError> {
        found(self.resources.get(id).await)
    }

    pub async fn update_storage_resource(
        &self,
        id: &str,
        mut resource: StorageResourceDescription,
    ) -> Result<(), CatalogError> {
        resource.storage_resource_id = id.to_string();
        Ok(self.resources.update(&resource).await?)
    }

    pub async fn remove_storage_resource(&self, id: &str) -> Result<(), CatalogError> {
        self.resources.delete(id).await?;
        info!(id, "Removed storage resource");
        Ok(())
    }

    pub async fn is_storage_resource_exists(&self, id: &str) -> Result<bool, CatalogError> {
        Ok(self.resources.exists(id).await?)
    }

    /// Resources matching every filter. Only `hostName` is accepted.
    pub async fn get_storage_resource_list(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<Vec<StorageResourceDescription>, CatalogError> {
        let filters = parse_filters(FilterTarget::StorageResource, filters)?;
        Ok(self.resources.filter(&filters).await?)
    }

    pub async fn get_all_storage_resources(
        &self,
    ) -> Result<Vec<StorageResourceDescription>, CatalogError> {
        Ok(self.resources.list().await?)
    }

    pub async fn get_all_storage_resource_ids(
        &self,
    ) -> Result<BTreeMap<String, String>, CatalogError> {
        Ok(self.resources.list_names(false).await?.into_iter().collect())
    }

    pub async fn get_available_storage_resource_ids(
        &self,
    ) -> Result<BTreeMap<String, String>, CatalogError> {
        Ok(self.resources.list_names(true).await?.into_iter().collect())
    }

    /// Attach a data movement tuple. Returns the interface id.
    pub async fn add_data_movement_interface(
        &self,
        storage_id: &str,
        interface: DataMovementInterface,
    ) -> Result<String, CatalogError> {
        if ids::is_unset(&interface.data_movement_interface_id) {
            return Err(CatalogError::InvalidInput(
                "data movement interface id is required".to_string(),
            ));
        }
        self.resources
            .add_data_movement_interface(storage_id, &interface)
            .await?;
        Ok(interface.data_movement_interface_id)
    }

    pub async fn remove_data_movement_interface(
        &self,
        storage_id: &str,
        interface_id: &str,
    ) -> Result<(), CatalogError> {
        let key = ResourceChildKey::new(storage_id, interface_id);
        Ok(self.resources.delete_data_movement_interface(&key).await?)
    }
}
