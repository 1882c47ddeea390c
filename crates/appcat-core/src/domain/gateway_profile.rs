//! Gateway resource profile types.

use serde::{Deserialize, Serialize};

use super::compute::{DataMovementProtocol, JobSubmissionProtocol};

/// How a gateway uses one compute resource. Keyed by `compute_resource_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeResourcePreference {
    pub compute_resource_id: String,
    pub override_by_airavata: bool,
    pub login_user_name: Option<String>,
    pub preferred_job_submission_protocol: Option<JobSubmissionProtocol>,
    pub preferred_data_movement_protocol: Option<DataMovementProtocol>,
    pub preferred_batch_queue: Option<String>,
    pub scratch_location: Option<String>,
    pub allocation_project_number: Option<String>,
    pub resource_specific_credential_store_token: Option<String>,
    pub usage_reporting_gateway_id: Option<String>,
    pub quality_of_service: Option<String>,
    pub reservation: Option<String>,
    pub reservation_start_time: Option<i64>,
    pub reservation_end_time: Option<i64>,
}

/// How a gateway uses one storage resource. Keyed by `storage_resource_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoragePreference {
    pub storage_resource_id: String,
    pub login_user_name: Option<String>,
    pub file_system_root_location: Option<String>,
    pub resource_specific_credential_store_token: Option<String>,
}

/// Per-gateway resource settings. The id is the gateway id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayResourceProfile {
    pub gateway_id: String,
    pub credential_store_token: Option<String>,
    pub compute_resource_preferences: Vec<ComputeResourcePreference>,
    pub storage_preferences: Vec<StoragePreference>,
    pub identity_server_tenant: Option<String>,
    pub identity_server_pwd_cred_token: Option<String>,
}

impl GatewayResourceProfile {
    /// An empty profile for `gateway_id`.
    pub fn new(gateway_id: impl Into<String>) -> Self {
        Self {
            gateway_id: gateway_id.into(),
            ..Self::default()
        }
    }
}
