//! Group resource profile service.
//!
//! Handles the parts of a group profile upsert that don't need storage:
//! id assignment for the profile, its policies and reservations, and the
//! creation/update timestamps. The repository applies the three child
//! collection diffs in one unit of work.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{info, instrument};

use crate::domain::{
    BatchQueueResourcePolicy, ComputeResourcePolicy, GroupComputeResourcePreference,
    GroupResourceProfile,
};
use crate::ids;
use crate::ports::{CatalogError, GroupProfileRepository, found};

pub struct GroupResourceProfileService {
    profiles: Arc<dyn GroupProfileRepository>,
}

impl GroupResourceProfileService {
    pub fn new(profiles: Arc<dyn GroupProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Store a new profile. Returns its id, a UUID unless the caller set one.
    pub async fn add_group_resource_profile(
        &self,
        mut profile: GroupResourceProfile,
    ) -> Result<String, CatalogError> {
        if ids::is_unset(&profile.group_resource_profile_id) {
            profile.group_resource_profile_id = ids::surrogate_id();
        }
        let stamp = now();
        profile.creation_time = Some(stamp);
        profile.updated_time = Some(stamp);
        assign_child_ids(&mut profile);

        self.profiles.insert(&profile).await?;
        info!(
            id = %profile.group_resource_profile_id,
            gateway_id = %profile.gateway_id,
            "Added group resource profile"
        );
        Ok(profile.group_resource_profile_id)
    }

    /// Replace a profile's scalars and its three child collections.
    ///
    /// The stored creation time wins over whatever `profile` carries.
    #[instrument(skip_all, fields(id = %profile.group_resource_profile_id))]
    pub async fn update_group_resource_profile(
        &self,
        mut profile: GroupResourceProfile,
    ) -> Result<(), CatalogError> {
        let existing = self.profiles.get(&profile.group_resource_profile_id).await?;

        profile.creation_time = existing.creation_time;
        profile.updated_time = Some(now());
        assign_child_ids(&mut profile);

        self.profiles.update(&profile).await?;
        info!(
            preferences = profile.compute_preferences.len(),
            compute_policies = profile.compute_resource_policies.len(),
            queue_policies = profile.batch_queue_resource_policies.len(),
            "Updated group resource profile"
        );
        Ok(())
    }

    pub async fn get_group_resource_profile(
        &self,
        id: &str,
    ) -> Result<Option<GroupResourceProfile>, CatalogError> {
        found(self.profiles.get(id).await)
    }

    pub async fn remove_group_resource_profile(&self, id: &str) -> Result<(), CatalogError> {
        self.profiles.delete(id).await?;
        info!(id, "Removed group resource profile");
        Ok(())
    }

    pub async fn is_group_resource_profile_exists(&self, id: &str) -> Result<bool, CatalogError> {
        Ok(self.profiles.exists(id).await?)
    }

    /// Profiles of a gateway restricted to `accessible_ids`. Empty when the
    /// caller may access none.
    pub async fn get_all_group_resource_profiles(
        &self,
        gateway_id: &str,
        accessible_ids: &[String],
    ) -> Result<Vec<GroupResourceProfile>, CatalogError> {
        if accessible_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.profiles.list(gateway_id, accessible_ids).await?)
    }

    pub async fn get_group_compute_resource_preference(
        &self,
        compute_resource_id: &str,
        group_profile_id: &str,
    ) -> Result<Option<GroupComputeResourcePreference>, CatalogError> {
        found(
            self.profiles
                .get_compute_preference(compute_resource_id, group_profile_id)
                .await,
        )
    }

    pub async fn is_group_compute_resource_preference_exists(
        &self,
        compute_resource_id: &str,
        group_profile_id: &str,
    ) -> Result<bool, CatalogError> {
        Ok(self
            .get_group_compute_resource_preference(compute_resource_id, group_profile_id)
            .await?
            .is_some())
    }

    pub async fn remove_group_compute_resource_preference(
        &self,
        compute_resource_id: &str,
        group_profile_id: &str,
    ) -> Result<(), CatalogError> {
        Ok(self
            .profiles
            .delete_compute_preference(compute_resource_id, group_profile_id)
            .await?)
    }

    pub async fn get_compute_resource_policy(
        &self,
        policy_id: &str,
    ) -> Result<Option<ComputeResourcePolicy>, CatalogError> {
        found(self.profiles.get_compute_policy(policy_id).await)
    }

    pub async fn remove_compute_resource_policy(
        &self,
        policy_id: &str,
    ) -> Result<(), CatalogError> {
        Ok(self.profiles.delete_compute_policy(policy_id).await?)
    }

    pub async fn get_batch_queue_resource_policy(
        &self,
        policy_id: &str,
    ) -> Result<Option<BatchQueueResourcePolicy>, CatalogError> {
        found(self.profiles.get_batch_queue_policy(policy_id).await)
    }

    pub async fn remove_batch_queue_resource_policy(
        &self,
        policy_id: &str,
    ) -> Result<(), CatalogError> {
        Ok(self.profiles.delete_batch_queue_policy(policy_id).await?)
    }

    pub async fn get_all_group_compute_resource_preferences(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<GroupComputeResourcePreference>, CatalogError> {
        Ok(self.profiles.list_compute_preferences(group_profile_id).await?)
    }

    pub async fn get_all_group_compute_resource_policies(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<ComputeResourcePolicy>, CatalogError> {
        Ok(self.profiles.list_compute_policies(group_profile_id).await?)
    }

    pub async fn get_all_group_batch_queue_resource_policies(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<BatchQueueResourcePolicy>, CatalogError> {
        Ok(self.profiles.list_batch_queue_policies(group_profile_id).await?)
    }
}

/// Timestamps are kept at millisecond precision so they survive storage.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Give every policy and reservation an id and point children at the profile.
fn assign_child_ids(profile: &mut GroupResourceProfile) {
    profile.stamp_children();
    for policy in &mut profile.compute_resource_policies {
        if ids::is_unset(&policy.resource_policy_id) {
            policy.resource_policy_id = ids::surrogate_id();
        }
    }
    for policy in &mut profile.batch_queue_resource_policies {
        if ids::is_unset(&policy.resource_policy_id) {
            policy.resource_policy_id = ids::surrogate_id();
        }
    }
    for pref in &mut profile.compute_preferences {
        for reservation in &mut pref.reservations {
            reservation.reservation_id =
                ids::generate_id(&reservation.reservation_id, &reservation.reservation_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ComputeResourceReservation;
    use crate::ports::RepositoryError;
    use crate::ports::group_profile_repository::MockGroupProfileRepository;
    use chrono::TimeZone;

    fn profile_with_children() -> GroupResourceProfile {
        GroupResourceProfile {
            gateway_id: "gw".to_string(),
            group_resource_profile_name: Some("group".to_string()),
            compute_preferences: vec![GroupComputeResourcePreference {
                compute_resource_id: "c1".to_string(),
                reservations: vec![ComputeResourceReservation {
                    reservation_name: "Maintenance Window".to_string(),
                    ..ComputeResourceReservation::default()
                }],
                ..GroupComputeResourcePreference::default()
            }],
            compute_resource_policies: vec![ComputeResourcePolicy {
                compute_resource_id: "c1".to_string(),
                ..ComputeResourcePolicy::default()
            }],
            batch_queue_resource_policies: vec![BatchQueueResourcePolicy {
                resource_policy_id: ids::DEFAULT_ID.to_string(),
                compute_resource_id: "c1".to_string(),
                ..BatchQueueResourcePolicy::default()
            }],
            ..GroupResourceProfile::default()
        }
    }

    #[tokio::test]
    async fn test_add_assigns_ids_and_timestamps() {
        let mut repo = MockGroupProfileRepository::new();
        repo.expect_insert()
            .withf(|p| {
                !p.group_resource_profile_id.is_empty()
                    && p.creation_time.is_some()
                    && p.creation_time == p.updated_time
                    && p.compute_preferences[0].group_resource_profile_id
                        == p.group_resource_profile_id
                    && !p.compute_resource_policies[0].resource_policy_id.is_empty()
                    && p.batch_queue_resource_policies[0].resource_policy_id != ids::DEFAULT_ID
                    && p.compute_preferences[0].reservations[0]
                        .reservation_id
                        .starts_with("maintenance_window_")
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = GroupResourceProfileService::new(Arc::new(repo));
        let id = service
            .add_group_resource_profile(profile_with_children())
            .await
            .unwrap();

        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_stored_creation_time() {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let stored = GroupResourceProfile {
            group_resource_profile_id: "grp".to_string(),
            creation_time: Some(created),
            ..GroupResourceProfile::default()
        };

        let mut repo = MockGroupProfileRepository::new();
        repo.expect_get()
            .withf(|id| id == "grp")
            .returning(move |_| Ok(stored.clone()));
        repo.expect_update()
            .withf(move |p| p.creation_time == Some(created) && p.updated_time > Some(created))
            .times(1)
            .returning(|_| Ok(()));

        let incoming = GroupResourceProfile {
            group_resource_profile_id: "grp".to_string(),
            creation_time: None,
            ..profile_with_children()
        };

        let service = GroupResourceProfileService::new(Arc::new(repo));
        service.update_group_resource_profile(incoming).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_keeps_existing_policy_ids() {
        let mut repo = MockGroupProfileRepository::new();
        repo.expect_get()
            .returning(|id| {
                Ok(GroupResourceProfile {
                    group_resource_profile_id: id.to_string(),
                    ..GroupResourceProfile::default()
                })
            });
        repo.expect_update()
            .withf(|p| p.compute_resource_policies[0].resource_policy_id == "policy-1")
            .returning(|_| Ok(()));

        let mut incoming = profile_with_children();
        incoming.group_resource_profile_id = "grp".to_string();
        incoming.compute_resource_policies[0].resource_policy_id = "policy-1".to_string();

        let service = GroupResourceProfileService::new(Arc::new(repo));
        service.update_group_resource_profile(incoming).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_of_missing_profile_is_not_found() {
        let mut repo = MockGroupProfileRepository::new();
        repo.expect_get()
            .returning(|id| Err(RepositoryError::NotFound(id.to_string())));
        repo.expect_update().never();

        let service = GroupResourceProfileService::new(Arc::new(repo));
        let err = service
            .update_group_resource_profile(GroupResourceProfile {
                group_resource_profile_id: "ghost".to_string(),
                ..GroupResourceProfile::default()
            })
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_with_no_accessible_ids_skips_storage() {
        let mut repo = MockGroupProfileRepository::new();
        repo.expect_list().never();

        let service = GroupResourceProfileService::new(Arc::new(repo));
        let profiles = service
            .get_all_group_resource_profiles("gw", &[])
            .await
            .unwrap();

        assert!(profiles.is_empty());
    }
}
