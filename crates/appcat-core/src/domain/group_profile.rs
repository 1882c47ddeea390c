//! Group resource profile types.
//!
//! A `GroupResourceProfile` owns three independent child collections:
//!
//! - compute preferences, keyed by compute resource id
//! - compute resource policies, keyed by `resource_policy_id`
//! - batch queue policies, keyed by `resource_policy_id`
//!
//! Policy ids are surrogate UUIDs assigned on first write. Reservations hang
//! off a compute preference and are keyed by `reservation_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::compute::{DataMovementProtocol, JobSubmissionProtocol};

/// A time-boxed reservation on a set of queues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeResourceReservation {
    /// Empty on write means "generate from `reservation_name`".
    pub reservation_id: String,
    pub reservation_name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub queue_names: Vec<String>,
}

/// How a group uses one compute resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupComputeResourcePreference {
    pub compute_resource_id: String,
    pub group_resource_profile_id: String,
    pub override_by_airavata: bool,
    pub login_user_name: Option<String>,
    pub preferred_job_submission_protocol: Option<JobSubmissionProtocol>,
    pub preferred_data_movement_protocol: Option<DataMovementProtocol>,
    pub preferred_batch_queue: Option<String>,
    pub scratch_location: Option<String>,
    pub allocation_project_number: Option<String>,
    /// `None` on update clears the stored token.
    pub resource_specific_credential_store_token: Option<String>,
    pub usage_reporting_gateway_id: Option<String>,
    pub quality_of_service: Option<String>,
    pub reservations: Vec<ComputeResourceReservation>,
}

/// Which batch queues a group may use on one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeResourcePolicy {
    pub resource_policy_id: String,
    pub compute_resource_id: String,
    pub group_resource_profile_id: String,
    pub allowed_batch_queues: Vec<String>,
}

/// Limits a group has on one queue of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchQueueResourcePolicy {
    pub resource_policy_id: String,
    pub compute_resource_id: String,
    pub group_resource_profile_id: String,
    pub queuename: Option<String>,
    pub max_allowed_nodes: Option<i32>,
    pub max_allowed_cores: Option<i32>,
    pub max_allowed_walltime: Option<i32>,
}

/// Resource settings shared by a sharing group of a gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupResourceProfile {
    pub gateway_id: String,
    pub group_resource_profile_id: String,
    pub group_resource_profile_name: Option<String>,
    pub compute_preferences: Vec<GroupComputeResourcePreference>,
    pub compute_resource_policies: Vec<ComputeResourcePolicy>,
    pub batch_queue_resource_policies: Vec<BatchQueueResourcePolicy>,
    pub default_credential_store_token: Option<String>,
    /// Set once on add. Updates never change the stored value.
    pub creation_time: Option<DateTime<Utc>>,
    pub updated_time: Option<DateTime<Utc>>,
}

impl GroupResourceProfile {
    /// Point every child row at this profile's id.
    pub fn stamp_children(&mut self) {
        let id = self.group_resource_profile_id.clone();
        for pref in &mut self.compute_preferences {
            pref.group_resource_profile_id.clone_from(&id);
        }
        for policy in &mut self.compute_resource_policies {
            policy.group_resource_profile_id.clone_from(&id);
        }
        for policy in &mut self.batch_queue_resource_policies {
            policy.group_resource_profile_id.clone_from(&id);
        }
    }

    /// Look up an owned compute preference by resource id.
    pub fn compute_preference(
        &self,
        compute_resource_id: &str,
    ) -> Option<&GroupComputeResourcePreference> {
        self.compute_preferences
            .iter()
            .find(|p| p.compute_resource_id == compute_resource_id)
    }
}
