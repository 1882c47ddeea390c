//! Gateway groups service.

use std::sync::Arc;

use tracing::info;

use crate::domain::GatewayGroups;
use crate::ports::{CatalogError, GatewayGroupsRepository, found};

pub struct GatewayGroupsService {
    groups: Arc<dyn GatewayGroupsRepository>,
}

impl GatewayGroupsService {
    pub fn new(groups: Arc<dyn GatewayGroupsRepository>) -> Self {
        Self { groups }
    }

    pub async fn add_gateway_groups(&self, groups: GatewayGroups) -> Result<(), CatalogError> {
        if groups.gateway_id.trim().is_empty() {
            return Err(CatalogError::InvalidInput(
                "gateway groups require a gateway id".to_string(),
            ));
        }
        self.groups.insert(&groups).await?;
        info!(gateway_id = %groups.gateway_id, "Added gateway groups");
        Ok(())
    }

    pub async fn update_gateway_groups(&self, groups: GatewayGroups) -> Result<(), CatalogError> {
        Ok(self.groups.update(&groups).await?)
    }

    pub async fn get_gateway_groups(
        &self,
        gateway_id: &str,
    ) -> Result<Option<GatewayGroups>, CatalogError> {
        found(self.groups.get(gateway_id).await)
    }

    pub async fn is_gateway_groups_exists(&self, gateway_id: &str) -> Result<bool, CatalogError> {
        Ok(self.groups.exists(gateway_id).await?)
    }

    pub async fn remove_gateway_groups(&self, gateway_id: &str) -> Result<(), CatalogError> {
        Ok(self.groups.delete(gateway_id).await?)
    }
}
