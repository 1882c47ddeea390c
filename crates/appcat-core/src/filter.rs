//! Field filters for catalog list queries.
//!
//! Callers pass a mapping of field name to value. Every key must be on the
//! allow-list of the entity being queried; an unknown key is rejected, never
//! ignored. Accepted filters are ANDed and compared by exact string match.

use std::collections::BTreeMap;

use thiserror::Error;

/// A filter key was not on the entity's allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter key '{key}' for {target}")]
pub struct FilterError {
    pub key: String,
    pub target: &'static str,
}

/// Entities that expose filtered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    ComputeResource,
    StorageResource,
    ApplicationModule,
    ApplicationInterface,
    ApplicationDeployment,
}

impl FilterTarget {
    const fn allowed(self) -> &'static [FilterField] {
        match self {
            Self::ComputeResource | Self::StorageResource => &[FilterField::HostName],
            Self::ApplicationModule => &[FilterField::AppModuleName],
            Self::ApplicationInterface => &[FilterField::ApplicationName],
            Self::ApplicationDeployment => &[FilterField::AppModuleId, FilterField::ComputeHostId],
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::ComputeResource => "compute resource",
            Self::StorageResource => "storage resource",
            Self::ApplicationModule => "application module",
            Self::ApplicationInterface => "application interface",
            Self::ApplicationDeployment => "application deployment",
        }
    }
}

/// Filterable attributes across all entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    HostName,
    AppModuleName,
    ApplicationName,
    AppModuleId,
    ComputeHostId,
}

impl FilterField {
    /// The key callers use for this field.
    pub const fn key(self) -> &'static str {
        match self {
            Self::HostName => "hostName",
            Self::AppModuleName => "appModuleName",
            Self::ApplicationName => "applicationName",
            Self::AppModuleId => "appModuleId",
            Self::ComputeHostId => "computeHostId",
        }
    }

    /// Storage column backing this field.
    pub const fn column(self) -> &'static str {
        match self {
            Self::HostName => "host_name",
            Self::AppModuleName => "app_module_name",
            Self::ApplicationName => "application_name",
            Self::AppModuleId => "app_module_id",
            Self::ComputeHostId => "compute_host_id",
        }
    }
}

/// One validated `field = value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: FilterField,
    pub value: String,
}

/// Validate raw filters against the allow-list for `target`.
pub fn parse_filters(
    target: FilterTarget,
    filters: &BTreeMap<String, String>,
) -> Result<Vec<FieldFilter>, FilterError> {
    filters
        .iter()
        .map(|(key, value)| {
            target
                .allowed()
                .iter()
                .find(|field| field.key() == key)
                .map(|&field| FieldFilter {
                    field,
                    value: value.clone(),
                })
                .ok_or_else(|| FilterError {
                    key: key.clone(),
                    target: target.label(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_known_key_is_accepted() {
        let parsed =
            parse_filters(FilterTarget::ComputeResource, &filters(&[("hostName", "localhost")]))
                .unwrap();
        assert_eq!(
            parsed,
            vec![FieldFilter {
                field: FilterField::HostName,
                value: "localhost".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_key_is_rejected_for_every_target() {
        for target in [
            FilterTarget::ComputeResource,
            FilterTarget::StorageResource,
            FilterTarget::ApplicationModule,
            FilterTarget::ApplicationInterface,
            FilterTarget::ApplicationDeployment,
        ] {
            let err = parse_filters(target, &filters(&[("NotAValidName", "x")])).unwrap_err();
            assert_eq!(err.key, "NotAValidName");
        }
    }

    #[test]
    fn test_key_from_another_entity_is_rejected() {
        let result = parse_filters(
            FilterTarget::ApplicationModule,
            &filters(&[("hostName", "localhost")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_deployment_accepts_both_keys() {
        let parsed = parse_filters(
            FilterTarget::ApplicationDeployment,
            &filters(&[("appModuleId", "m1"), ("computeHostId", "c1")]),
        )
        .unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_empty_filters_parse_to_nothing() {
        let parsed = parse_filters(FilterTarget::StorageResource, &BTreeMap::new()).unwrap();
        assert!(parsed.is_empty());
    }
}
