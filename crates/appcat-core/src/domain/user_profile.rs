//! User resource profile types.
//!
//! Profiles are keyed by `(user_id, gateway_id)`; their preferences are
//! addressable by `(user_id, gateway_id, resource id)`.

use serde::{Deserialize, Serialize};

use super::keys::UserProfileKey;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserComputeResourcePreference {
    pub compute_resource_id: String,
    pub login_user_name: Option<String>,
    pub preferred_batch_queue: Option<String>,
    pub scratch_location: Option<String>,
    pub allocation_project_number: Option<String>,
    pub resource_specific_credential_store_token: Option<String>,
    pub quality_of_service: Option<String>,
    pub reservation: Option<String>,
    pub reservation_start_time: Option<i64>,
    pub reservation_end_time: Option<i64>,
    pub validated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStoragePreference {
    pub storage_resource_id: String,
    pub login_user_name: Option<String>,
    pub file_system_root_location: Option<String>,
    pub resource_specific_credential_store_token: Option<String>,
}

/// Resource settings of one user within one gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserResourceProfile {
    pub user_id: String,
    pub gateway_id: String,
    pub credential_store_token: Option<String>,
    pub user_compute_resource_preferences: Vec<UserComputeResourcePreference>,
    pub user_storage_preferences: Vec<UserStoragePreference>,
    pub identity_server_tenant: Option<String>,
    pub identity_server_pwd_cred_token: Option<String>,
}

impl UserResourceProfile {
    pub fn new(user_id: impl Into<String>, gateway_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            gateway_id: gateway_id.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> UserProfileKey {
        UserProfileKey::new(&self.user_id, &self.gateway_id)
    }
}
