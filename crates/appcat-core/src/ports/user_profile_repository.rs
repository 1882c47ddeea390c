//! User resource profile repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{UserProfileKey, UserResourceProfile};

/// Repository for user resource profiles, keyed by `(user_id, gateway_id)`.
///
/// Preferences are addressed by the profile key plus a resource id.
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Returns `Err(RepositoryError::AlreadyExists)` if the key is taken.
    async fn insert(&self, profile: &UserResourceProfile) -> Result<(), RepositoryError>;
    async fn get(&self, key: &UserProfileKey) -> Result<UserResourceProfile, RepositoryError>;
    async fn update(&self, profile: &UserResourceProfile) -> Result<(), RepositoryError>;
    async fn delete(&self, key: &UserProfileKey) -> Result<(), RepositoryError>;
    async fn exists(&self, key: &UserProfileKey) -> Result<bool, RepositoryError>;
    async fn list(&self) -> Result<Vec<UserResourceProfile>, RepositoryError>;

    async fn delete_compute_preference(
        &self,
        key: &UserProfileKey,
        compute_resource_id: &str,
    ) -> Result<(), RepositoryError>;
    async fn delete_storage_preference(
        &self,
        key: &UserProfileKey,
        storage_resource_id: &str,
    ) -> Result<(), RepositoryError>;
}
