//! Composite keys for rows with no single-column identity.

use std::fmt;

/// `(user_id, gateway_id)` key of a user resource profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserProfileKey {
    pub user_id: String,
    pub gateway_id: String,
}

impl UserProfileKey {
    pub fn new(user_id: impl Into<String>, gateway_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            gateway_id: gateway_id.into(),
        }
    }

    /// Both halves must be present for a lookup to be meaningful.
    pub fn is_complete(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.gateway_id.trim().is_empty()
    }
}

impl fmt::Display for UserProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user_id, self.gateway_id)
    }
}

/// `(resource id, child id)` key of a row owned by a compute or storage
/// resource: a batch queue name or an interface id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceChildKey {
    pub resource_id: String,
    pub child_id: String,
}

impl ResourceChildKey {
    pub fn new(resource_id: impl Into<String>, child_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            child_id: child_id.into(),
        }
    }
}

impl fmt::Display for ResourceChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_id, self.child_id)
    }
}
