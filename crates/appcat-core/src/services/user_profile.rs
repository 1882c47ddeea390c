//! User resource profile service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    UserComputeResourcePreference, UserProfileKey, UserResourceProfile, UserStoragePreference,
};
use crate::ports::{CatalogError, UserProfileRepository, found};

/// Service for user resource profiles.
///
/// Every lookup needs both halves of the `(user, gateway)` key; a partial
/// key is rejected as invalid input instead of matching nothing.
pub struct UserResourceProfileService {
    profiles: Arc<dyn UserProfileRepository>,
}

impl UserResourceProfileService {
    pub fn new(profiles: Arc<dyn UserProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Store a new profile. Returns the user id.
    pub async fn add_user_resource_profile(
        &self,
        profile: UserResourceProfile,
    ) -> Result<String, CatalogError> {
        let key = checked(profile.key())?;
        self.profiles.insert(&profile).await?;
        info!(%key, "Added user resource profile");
        Ok(profile.user_id)
    }

    pub async fn update_user_resource_profile(
        &self,
        user_id: &str,
        gateway_id: &str,
        mut profile: UserResourceProfile,
    ) -> Result<(), CatalogError> {
        let key = checked(UserProfileKey::new(user_id, gateway_id))?;
        profile.user_id = key.user_id.clone();
        profile.gateway_id = key.gateway_id.clone();
        self.profiles.update(&profile).await?;
        info!(%key, "Updated user resource profile");
        Ok(())
    }

    pub async fn get_user_resource_profile(
        &self,
        user_id: &str,
        gateway_id: &str,
    ) -> Result<Option<UserResourceProfile>, CatalogError> {
        let key = checked(UserProfileKey::new(user_id, gateway_id))?;
        found(self.profiles.get(&key).await)
    }

    pub async fn is_user_resource_profile_exists(
        &self,
        user_id: &str,
        gateway_id: &str,
    ) -> Result<bool, CatalogError> {
        let key = checked(UserProfileKey::new(user_id, gateway_id))?;
        Ok(self.profiles.exists(&key).await?)
    }

    pub async fn remove_user_resource_profile(
        &self,
        user_id: &str,
        gateway_id: &str,
    ) -> Result<(), CatalogError> {
        let key = checked(UserProfileKey::new(user_id, gateway_id))?;
        self.profiles.delete(&key).await?;
        info!(%key, "Removed user resource profile");
        Ok(())
    }

    pub async fn get_all_user_resource_profiles(
        &self,
    ) -> Result<Vec<UserResourceProfile>, CatalogError> {
        Ok(self.profiles.list().await?)
    }

    pub async fn get_user_compute_resource_preference(
        &self,
        user_id: &str,
        gateway_id: &str,
        compute_resource_id: &str,
    ) -> Result<Option<UserComputeResourcePreference>, CatalogError> {
        Ok(self
            .get_user_resource_profile(user_id, gateway_id)
            .await?
            .and_then(|p| {
                p.user_compute_resource_preferences
                    .into_iter()
                    .find(|pref| pref.compute_resource_id == compute_resource_id)
            }))
    }

    pub async fn is_user_compute_resource_preference_exists(
        &self,
        user_id: &str,
        gateway_id: &str,
        compute_resource_id: &str,
    ) -> Result<bool, CatalogError> {
        Ok(self
            .get_user_compute_resource_preference(user_id, gateway_id, compute_resource_id)
            .await?
            .is_some())
    }

    pub async fn remove_user_compute_resource_preference(
        &self,
        user_id: &str,
        gateway_id: &str,
        compute_resource_id: &str,
    ) -> Result<(), CatalogError> {
        let key = checked(UserProfileKey::new(user_id, gateway_id))?;
        Ok(self
            .profiles
            .delete_compute_preference(&key, compute_resource_id)
            .await?)
    }

    pub async fn get_all_user_compute_resource_preferences(
        &self,
        user_id: &str,
        gateway_id: &str,
    ) -> Result<Vec<UserComputeResourcePreference>, CatalogError> {
        Ok(self
            .get_user_resource_profile(user_id, gateway_id)
            .await?
            .map(|p| p.user_compute_resource_preferences)
            .unwrap_or_default())
    }

    pub async fn get_user_storage_preference(
        &self,
        user_id: &str,
        gateway_id: &str,
        storage_resource_id: &str,
    ) -> Result<Option<UserStoragePreference>, CatalogError> {
        Ok(self
            .get_user_resource_profile(user_id, gateway_id)
            .await?
            .and_then(|p| {
                p.user_storage_preferences
                    .into_iter()
                    .find(|pref| pref.storage_resource_id == storage_resource_id)
            }))
    }

    pub async fn remove_user_storage_preference(
        &self,
        user_id: &str,
        gateway_id: &str,
        storage_resource_id: &str,
    ) -> Result<(), CatalogError> {
        let key = checked(UserProfileKey::new(user_id, gateway_id))?;
        Ok(self
            .profiles
            .delete_storage_preference(&key, storage_resource_id)
            .await?)
    }

    pub async fn get_all_user_storage_preferences(
        &self,
        user_id: &str,
        gateway_id: &str,
    ) -> Result<Vec<UserStoragePreference>, CatalogError> {
        Ok(self
            .get_user_resource_profile(user_id, gateway_id)
            .await?
            .map(|p| p.user_storage_preferences)
            .unwrap_or_default())
    }
}

fn checked(key: UserProfileKey) -> Result<UserProfileKey, CatalogError> {
    if key.is_complete() {
        Ok(key)
    } else {
        warn!(%key, "Rejected incomplete user profile key");
        Err(CatalogError::InvalidInput(format!(
            "user profile key requires user and gateway ids, got '{key}'"
        )))
    }
}
