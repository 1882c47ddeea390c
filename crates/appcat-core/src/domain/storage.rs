//! Storage resource types.

use serde::{Deserialize, Serialize};

use super::compute::DataMovementInterface;

/// A registered storage host. Owns its data movement interface tuples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageResourceDescription {
    /// Empty on add means "generate from `host_name`".
    pub storage_resource_id: String,
    pub host_name: String,
    pub storage_resource_description: Option<String>,
    pub enabled: bool,
    pub data_movement_interfaces: Vec<DataMovementInterface>,
}
