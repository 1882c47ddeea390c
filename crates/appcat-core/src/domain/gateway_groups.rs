//! Gateway group id records.

use serde::{Deserialize, Serialize};

/// The well-known sharing groups of one gateway. Keyed by `gateway_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayGroups {
    pub gateway_id: String,
    pub admins_group_id: String,
    pub read_only_admins_group_id: String,
    pub default_gateway_users_group_id: String,
}
