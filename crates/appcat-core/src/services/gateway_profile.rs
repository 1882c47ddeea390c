//! Gateway resource profile service.

use std::sync::Arc;

use tracing::info;

use crate::domain::{ComputeResourcePreference, GatewayResourceProfile, StoragePreference};
use crate::ports::{CatalogError, GatewayProfileRepository, found};

/// Service for gateway resource profiles.
///
/// Profiles are keyed by gateway id, which callers always supply.
pub struct GwyResourceProfileService {
    profiles: Arc<dyn GatewayProfileRepository>,
}

impl GwyResourceProfileService {
    pub fn new(profiles: Arc<dyn GatewayProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Store a new profile. Returns the gateway id.
    pub async fn add_gateway_resource_profile(
        &self,
        profile: GatewayResourceProfile,
    ) -> Result<String, CatalogError> {
        if profile.gateway_id.trim().is_empty() {
            return Err(CatalogError::InvalidInput(
                "gateway resource profile requires a gateway id".to_string(),
            ));
        }
        self.profiles.insert(&profile).await?;
        info!(gateway_id = %profile.gateway_id, "Added gateway resource profile");
        Ok(profile.gateway_id)
    }

    pub async fn get_gateway_profile(
        &self,
        gateway_id: &str,
    ) -> Result<Option<GatewayResourceProfile>, CatalogError> {
        found(self.profiles.get(gateway_id).await)
    }

    /// Replace a profile and both of its preference lists.
    pub async fn update_gateway_resource_profile(
        &self,
        gateway_id: &str,
        mut profile: GatewayResourceProfile,
    ) -> Result<(), CatalogError> {
        profile.gateway_id = gateway_id.to_string();
        self.profiles.update(&profile).await?;
        info!(gateway_id, "Updated gateway resource profile");
        Ok(())
    }

    pub async fn remove_gateway_resource_profile(
        &self,
        gateway_id: &str,
    ) -> Result<(), CatalogError> {
        self.profiles.delete(gateway_id).await?;
        info!(gateway_id, "Removed gateway resource profile");
        Ok(())
    }

    pub async fn is_gateway_resource_profile_exists(
        &self,
        gateway_id: &str,
    ) -> Result<bool, CatalogError> {
        Ok(self.profiles.exists(gateway_id).await?)
    }

    pub async fn get_all_gateway_profiles(
        &self,
    ) -> Result<Vec<GatewayResourceProfile>, CatalogError> {
        Ok(self.profiles.list().await?)
    }

    pub async fn get_compute_resource_preference(
        &self,
        gateway_id: &str,
        compute_resource_id: &str,
    ) -> Result<Option<ComputeResourcePreference>, CatalogError> {
        Ok(self.get_gateway_profile(gateway_id).await?.and_then(|p| {
            p.compute_resource_preferences
                .into_iter()
                .find(|pref| pref.compute_resource_id == compute_resource_id)
        }))
    }

    pub async fn get_storage_preference(
        &self,
        gateway_id: &str,
        storage_resource_id: &str,
    ) -> Result<Option<StoragePreference>, CatalogError> {
        Ok(self.get_gateway_profile(gateway_id).await?.and_then(|p| {
            p.storage_preferences
                .into_iter()
                .find(|pref| pref.storage_resource_id == storage_resource_id)
        }))
    }

    /// Compute preferences of a gateway. Empty when it has no profile.
    pub async fn get_all_compute_resource_preferences(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<ComputeResourcePreference>, CatalogError> {
        Ok(self
            .get_gateway_profile(gateway_id)
            .await?
            .map(|p| p.compute_resource_preferences)
            .unwrap_or_default())
    }

    /// Storage preferences of a gateway. Empty when it has no profile.
    pub async fn get_all_storage_preferences(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<StoragePreference>, CatalogError> {
        Ok(self
            .get_gateway_profile(gateway_id)
            .await?
            .map(|p| p.storage_preferences)
            .unwrap_or_default())
    }

    pub async fn remove_compute_resource_preference(
        &self,
        gateway_id: &str,
        compute_resource_id: &str,
    ) -> Result<(), CatalogError> {
        Ok(self
            .profiles
            .delete_compute_preference(gateway_id, compute_resource_id)
            .await?)
    }

    pub async fn remove_storage_preference(
        &self,
        gateway_id: &str,
        storage_resource_id: &str,
    ) -> Result<(), CatalogError> {
        Ok(self
            .profiles
            .delete_storage_preference(gateway_id, storage_resource_id)
            .await?)
    }
}
