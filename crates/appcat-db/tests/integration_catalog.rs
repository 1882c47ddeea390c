//! End-to-end catalog behaviour over the `SQLite` store.

mod common;

use std::collections::BTreeMap;

use appcat_core::CatalogError;
use appcat_core::domain::{
    BatchQueueResourcePolicy, ComputeResourcePreference, ComputeResourcePolicy,
    GroupComputeResourcePreference, GroupResourceProfile, LocalSubmission, ResourceJobManager,
    ResourceJobManagerType, SshJobSubmission,
};

use common::{
    catalog, catalog_with_pool, default_gateway, deployment, gateway_profile, module,
    prepare_compute_resource,
};

#[tokio::test]
async fn test_batch_queue_removal() {
    let catalog = catalog().await;
    let compute = catalog.compute();
    let id = compute
        .add_compute_resource(prepare_compute_resource("stampede.example.org", 4))
        .await
        .unwrap();

    compute.remove_batch_queue(&id, "q0").await.unwrap();

    let resource = compute.get_compute_resource(&id).await.unwrap().unwrap();
    assert_eq!(resource.batch_queues.len(), 3);
    assert!(resource.batch_queue("q0").is_none());
    assert!(compute.get_batch_queue(&id, "q1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_compute_resource_round_trip() {
    let catalog = catalog().await;
    let original = prepare_compute_resource("comet.example.org", 2);

    let id = catalog.compute().add_compute_resource(original.clone()).await.unwrap();
    let stored = catalog.compute().get_compute_resource(&id).await.unwrap().unwrap();

    assert!(id.starts_with("comet_example_org_"));
    assert_eq!(
        stored,
        appcat_core::domain::ComputeResourceDescription {
            compute_resource_id: id,
            ..original
        }
    );
}

#[tokio::test]
async fn test_accessible_modules() {
    let catalog = catalog().await;
    let gateway = default_gateway();

    for host in ["c1", "c2"] {
        let mut resource = prepare_compute_resource(&format!("{host}.example.org"), 1);
        resource.compute_resource_id = host.to_string();
        catalog.compute().add_compute_resource(resource).await.unwrap();
    }

    let apps = catalog.applications();
    let mut m1 = module("m1");
    m1.app_module_id = "m1".to_string();
    let mut m2 = module("m2");
    m2.app_module_id = "m2".to_string();
    apps.add_application_module(m1.clone(), &gateway).await.unwrap();
    apps.add_application_module(m2, &gateway).await.unwrap();

    for (dep_id, host) in [("d1", "c1"), ("d2", "c2")] {
        let mut dep = deployment("m1", host);
        dep.app_deployment_id = dep_id.to_string();
        catalog.deployments().add_application_deployment(dep, &gateway).await.unwrap();
    }

    let ids = |v: &[&str]| v.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();

    let found = apps
        .get_accessible_application_modules(&gateway, &ids(&["d1"]), &ids(&["c1"]))
        .await
        .unwrap();
    assert_eq!(found, vec![m1.clone()]);

    let mismatched = apps
        .get_accessible_application_modules(&gateway, &ids(&["d1"]), &ids(&["c2"]))
        .await
        .unwrap();
    assert!(mismatched.is_empty());

    let deduped = apps
        .get_accessible_application_modules(&gateway, &ids(&["d1", "d2"]), &ids(&["c1", "c2"]))
        .await
        .unwrap();
    assert_eq!(deduped, vec![m1]);
}

#[tokio::test]
async fn test_default_gateway_profile_invariant() {
    let catalog = catalog().await;
    let profiles = catalog.gateway_profiles();

    let initial = profiles.get_all_gateway_profiles().await.unwrap();
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].gateway_id, default_gateway());

    profiles.add_gateway_resource_profile(gateway_profile("gw-a")).await.unwrap();
    profiles.add_gateway_resource_profile(gateway_profile("gw-b")).await.unwrap();

    assert_eq!(profiles.get_all_gateway_profiles().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_gateway_preference_token_can_be_cleared() {
    let catalog = catalog().await;
    let profiles = catalog.gateway_profiles();

    let mut profile = gateway_profile("gw-a");
    profile.compute_resource_preferences = vec![ComputeResourcePreference {
        compute_resource_id: "c1".to_string(),
        resource_specific_credential_store_token: Some("secret".to_string()),
        ..ComputeResourcePreference::default()
    }];
    profiles.add_gateway_resource_profile(profile.clone()).await.unwrap();

    profile.compute_resource_preferences[0].resource_specific_credential_store_token = None;
    profiles.update_gateway_resource_profile("gw-a", profile).await.unwrap();

    let pref = profiles
        .get_compute_resource_preference("gw-a", "c1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pref.resource_specific_credential_store_token, None);
}

fn group_profile() -> GroupResourceProfile {
    let pref = |id: &str| GroupComputeResourcePreference {
        compute_resource_id: id.to_string(),
        login_user_name: Some("svc".to_string()),
        ..GroupComputeResourcePreference::default()
    };
    GroupResourceProfile {
        gateway_id: default_gateway(),
        group_resource_profile_name: Some("project-x".to_string()),
        compute_preferences: vec![pref("c1"), pref("c2")],
        compute_resource_policies: vec![ComputeResourcePolicy {
            compute_resource_id: "c1".to_string(),
            allowed_batch_queues: vec!["normal".to_string()],
            ..ComputeResourcePolicy::default()
        }],
        batch_queue_resource_policies: vec![BatchQueueResourcePolicy {
            compute_resource_id: "c1".to_string(),
            queuename: Some("normal".to_string()),
            max_allowed_nodes: Some(4),
            max_allowed_walltime: Some(60),
            ..BatchQueueResourcePolicy::default()
        }],
        ..GroupResourceProfile::default()
    }
}

#[tokio::test]
async fn test_group_profile_orphan_removal() {
    let catalog = catalog().await;
    let groups = catalog.group_profiles();
    let id = groups.add_group_resource_profile(group_profile()).await.unwrap();

    let mut profile = groups.get_group_resource_profile(&id).await.unwrap().unwrap();
    profile.compute_preferences.truncate(1);
    profile.compute_resource_policies.clear();
    groups.update_group_resource_profile(profile).await.unwrap();

    let prefs = groups.get_all_group_compute_resource_preferences(&id).await.unwrap();
    assert_eq!(prefs.len(), 1);
    assert_eq!(prefs[0].compute_resource_id, "c1");
    assert!(
        !groups
            .is_group_compute_resource_preference_exists("c2", &id)
            .await
            .unwrap()
    );
    assert!(groups.get_all_group_compute_resource_policies(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_preference_update_leaves_policies_untouched() {
    let catalog = catalog().await;
    let groups = catalog.group_profiles();
    let id = groups.add_group_resource_profile(group_profile()).await.unwrap();
    let compute_policies = groups.get_all_group_compute_resource_policies(&id).await.unwrap();
    let queue_policies = groups.get_all_group_batch_queue_resource_policies(&id).await.unwrap();
    assert_eq!(compute_policies.len(), 1);
    assert_eq!(queue_policies.len(), 1);

    let mut profile = groups.get_group_resource_profile(&id).await.unwrap().unwrap();
    profile.compute_preferences.truncate(1);
    profile.compute_preferences[0].login_user_name = Some("other".to_string());
    groups.update_group_resource_profile(profile).await.unwrap();

    assert_eq!(
        groups.get_all_group_compute_resource_policies(&id).await.unwrap(),
        compute_policies
    );
    assert_eq!(
        groups.get_all_group_batch_queue_resource_policies(&id).await.unwrap(),
        queue_policies
    );
    let prefs = groups.get_all_group_compute_resource_preferences(&id).await.unwrap();
    assert_eq!(prefs.len(), 1);
    assert_eq!(prefs[0].login_user_name.as_deref(), Some("other"));
}

#[tokio::test]
async fn test_group_profile_creation_time_is_immutable() {
    let catalog = catalog().await;
    let groups = catalog.group_profiles();
    let id = groups.add_group_resource_profile(group_profile()).await.unwrap();
    let original = groups.get_group_resource_profile(&id).await.unwrap().unwrap();
    assert!(original.creation_time.is_some());

    let mut stale = original.clone();
    stale.creation_time = None;
    stale.group_resource_profile_name = Some("renamed".to_string());
    groups.update_group_resource_profile(stale).await.unwrap();

    let stored = groups.get_group_resource_profile(&id).await.unwrap().unwrap();
    assert_eq!(stored.creation_time, original.creation_time);
    assert_eq!(stored.group_resource_profile_name.as_deref(), Some("renamed"));
}

#[tokio::test]
async fn test_group_profiles_limited_to_accessible_ids() {
    let catalog = catalog().await;
    let groups = catalog.group_profiles();
    let first = groups.add_group_resource_profile(group_profile()).await.unwrap();
    groups.add_group_resource_profile(group_profile()).await.unwrap();

    let visible = groups
        .get_all_group_resource_profiles(&default_gateway(), &[first.clone()])
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].group_resource_profile_id, first);

    assert!(
        groups
            .get_all_group_resource_profiles(&default_gateway(), &[])
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_unknown_filter_key_is_rejected_everywhere() {
    let catalog = catalog().await;
    let filters = BTreeMap::from([("color".to_string(), "blue".to_string())]);

    let errors = [
        catalog.compute().get_compute_resource_list(&filters).await.unwrap_err(),
        catalog.storage().get_storage_resource_list(&filters).await.unwrap_err(),
        catalog.applications().get_application_modules(&filters).await.unwrap_err(),
        catalog.applications().get_application_interfaces(&filters).await.unwrap_err(),
        catalog.deployments().get_application_deployments(&filters).await.unwrap_err(),
    ];

    for err in errors {
        assert!(err.is_invalid_input(), "{err}");
    }
}

#[tokio::test]
async fn test_update_and_remove_of_missing_ids() {
    let catalog = catalog().await;

    let err = catalog
        .compute()
        .update_compute_resource("ghost", prepare_compute_resource("ghost", 0))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(catalog.compute().remove_compute_resource("ghost").await.unwrap_err().is_not_found());
    assert!(
        catalog
            .applications()
            .update_application_module("ghost", module("ghost"))
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        catalog
            .deployments()
            .remove_application_deployment("ghost")
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        catalog
            .group_profiles()
            .remove_group_resource_profile("ghost")
            .await
            .unwrap_err()
            .is_not_found()
    );

    // Lookups report absence instead of failing.
    assert!(catalog.compute().get_compute_resource("ghost").await.unwrap().is_none());
    assert!(catalog.storage().get_storage_resource("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_add_is_rejected() {
    let catalog = catalog().await;

    let err = catalog
        .gateway_profiles()
        .add_gateway_resource_profile(gateway_profile(&default_gateway()))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::AlreadyExists(_)));
}

async fn manager_rows(pool: &sqlx::SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM resource_job_managers")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_submission_updates_keep_one_manager_row() {
    let (catalog, pool) = catalog_with_pool().await;
    let compute = catalog.compute();
    let pbs = || ResourceJobManager {
        resource_job_manager_type: ResourceJobManagerType::Pbs,
        ..ResourceJobManager::default()
    };

    let ssh_id = compute
        .add_ssh_job_submission(SshJobSubmission {
            resource_job_manager: pbs(),
            ..SshJobSubmission::default()
        })
        .await
        .unwrap();
    let local_id = compute
        .add_local_submission(LocalSubmission {
            resource_job_manager: pbs(),
            ..LocalSubmission::default()
        })
        .await
        .unwrap();
    assert_eq!(manager_rows(&pool).await, 2);

    for _ in 0..3 {
        let ssh = SshJobSubmission {
            resource_job_manager: pbs(),
            ..SshJobSubmission::default()
        };
        compute.update_ssh_job_submission(&ssh_id, ssh).await.unwrap();
        let local = LocalSubmission {
            resource_job_manager: pbs(),
            ..LocalSubmission::default()
        };
        compute.update_local_submission(&local_id, local).await.unwrap();
    }

    assert_eq!(manager_rows(&pool).await, 2);
    let stored = compute.get_ssh_job_submission(&ssh_id).await.unwrap().unwrap();
    assert_eq!(
        stored.resource_job_manager.resource_job_manager_type,
        ResourceJobManagerType::Pbs
    );
}
