//! `SQLite` implementation of the user resource profile repository.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use appcat_core::domain::{
    UserComputeResourcePreference, UserProfileKey, UserResourceProfile, UserStoragePreference,
};
use appcat_core::ports::UserProfileRepository;
use appcat_core::sync;
use appcat_core::RepositoryError;

use super::row_mappers::{ensure_affected, map_sqlx_error, position, row_exists, stored_keys};

const PROFILE_COLUMNS: &str = "user_id, gateway_id, credential_store_token, \
     identity_server_tenant, identity_server_pwd_cred_token";

/// `SQLite` implementation of the user resource profile repository.
pub struct SqliteUserProfileRepository {
    pool: SqlitePool,
}

impl SqliteUserProfileRepository {
    /// Create a new `SQLite` user profile repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    gateway_id: String,
    credential_store_token: Option<String>,
    identity_server_tenant: Option<String>,
    identity_server_pwd_cred_token: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ComputePreferenceRow {
    compute_resource_id: String,
    login_user_name: Option<String>,
    preferred_batch_queue: Option<String>,
    scratch_location: Option<String>,
    allocation_project_number: Option<String>,
    resource_specific_credential_store_token: Option<String>,
    quality_of_service: Option<String>,
    reservation: Option<String>,
    reservation_start_time: Option<i64>,
    reservation_end_time: Option<i64>,
    validated: bool,
}

impl From<ComputePreferenceRow> for UserComputeResourcePreference {
    fn from(row: ComputePreferenceRow) -> Self {
        Self {
            compute_resource_id: row.compute_resource_id,
            login_user_name: row.login_user_name,
            preferred_batch_queue: row.preferred_batch_queue,
            scratch_location: row.scratch_location,
            allocation_project_number: row.allocation_project_number,
            resource_specific_credential_store_token: row.resource_specific_credential_store_token,
            quality_of_service: row.quality_of_service,
            reservation: row.reservation,
            reservation_start_time: row.reservation_start_time,
            reservation_end_time: row.reservation_end_time,
            validated: row.validated,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StoragePreferenceRow {
    storage_resource_id: String,
    login_user_name: Option<String>,
    file_system_root_location: Option<String>,
    resource_specific_credential_store_token: Option<String>,
}

impl From<StoragePreferenceRow> for UserStoragePreference {
    fn from(row: StoragePreferenceRow) -> Self {
        Self {
            storage_resource_id: row.storage_resource_id,
            login_user_name: row.login_user_name,
            file_system_root_location: row.file_system_root_location,
            resource_specific_credential_store_token: row.resource_specific_credential_store_token,
        }
    }
}

async fn hydrate(
    conn: &mut SqliteConnection,
    row: ProfileRow,
) -> Result<UserResourceProfile, RepositoryError> {
    let user_compute_resource_preferences = sqlx::query_as::<_, ComputePreferenceRow>(
        r"
        SELECT compute_resource_id, login_user_name, preferred_batch_queue, scratch_location,
               allocation_project_number, resource_specific_credential_store_token,
               quality_of_service, reservation, reservation_start_time, reservation_end_time,
               validated
        FROM user_compute_preferences WHERE user_id = ? AND gateway_id = ? ORDER BY position
        ",
    )
    .bind(&row.user_id)
    .bind(&row.gateway_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(UserComputeResourcePreference::from)
    .collect();

    let user_storage_preferences = sqlx::query_as::<_, StoragePreferenceRow>(
        r"
        SELECT storage_resource_id, login_user_name, file_system_root_location,
               resource_specific_credential_store_token
        FROM user_storage_preferences WHERE user_id = ? AND gateway_id = ? ORDER BY position
        ",
    )
    .bind(&row.user_id)
    .bind(&row.gateway_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(UserStoragePreference::from)
    .collect();

    Ok(UserResourceProfile {
        user_id: row.user_id,
        gateway_id: row.gateway_id,
        credential_store_token: row.credential_store_token,
        user_compute_resource_preferences,
        user_storage_preferences,
        identity_server_tenant: row.identity_server_tenant,
        identity_server_pwd_cred_token: row.identity_server_pwd_cred_token,
    })
}

async fn write_compute_preference(
    conn: &mut SqliteConnection,
    key: &UserProfileKey,
    index: usize,
    pref: &UserComputeResourcePreference,
    existing: bool,
) -> Result<(), RepositoryError> {
    let sql = if existing {
        r"
        UPDATE user_compute_preferences
        SET position = ?, login_user_name = ?, preferred_batch_queue = ?, scratch_location = ?,
            allocation_project_number = ?, resource_specific_credential_store_token = ?,
            quality_of_service = ?, reservation = ?, reservation_start_time = ?,
            reservation_end_time = ?, validated = ?
        WHERE user_id = ? AND gateway_id = ? AND compute_resource_id = ?
        "
    } else {
        r"
        INSERT INTO user_compute_preferences (
            position, login_user_name, preferred_batch_queue, scratch_location,
            allocation_project_number, resource_specific_credential_store_token,
            quality_of_service, reservation, reservation_start_time, reservation_end_time,
            validated, user_id, gateway_id, compute_resource_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "
    };

    sqlx::query(sql)
        .bind(position(index))
        .bind(&pref.login_user_name)
        .bind(&pref.preferred_batch_queue)
        .bind(&pref.scratch_location)
        .bind(&pref.allocation_project_number)
        .bind(&pref.resource_specific_credential_store_token)
        .bind(&pref.quality_of_service)
        .bind(&pref.reservation)
        .bind(pref.reservation_start_time)
        .bind(pref.reservation_end_time)
        .bind(pref.validated)
        .bind(&key.user_id)
        .bind(&key.gateway_id)
        .bind(&pref.compute_resource_id)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

async fn write_storage_preference(
    conn: &mut SqliteConnection,
    key: &UserProfileKey,
    index: usize,
    pref: &UserStoragePreference,
    existing: bool,
) -> Result<(), RepositoryError> {
    let sql = if existing {
        r"
        UPDATE user_storage_preferences
        SET position = ?, login_user_name = ?, file_system_root_location = ?,
            resource_specific_credential_store_token = ?
        WHERE user_id = ? AND gateway_id = ? AND storage_resource_id = ?
        "
    } else {
        r"
        INSERT INTO user_storage_preferences (
            position, login_user_name, file_system_root_location,
            resource_specific_credential_store_token, user_id, gateway_id, storage_resource_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "
    };

    sqlx::query(sql)
        .bind(position(index))
        .bind(&pref.login_user_name)
        .bind(&pref.file_system_root_location)
        .bind(&pref.resource_specific_credential_store_token)
        .bind(&key.user_id)
        .bind(&key.gateway_id)
        .bind(&pref.storage_resource_id)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

async fn sync_preferences(
    conn: &mut SqliteConnection,
    profile: &UserResourceProfile,
) -> Result<(), RepositoryError> {
    let key = profile.key();
    let parent = [key.user_id.as_str(), key.gateway_id.as_str()];

    let stored = stored_keys(
        conn,
        "SELECT compute_resource_id FROM user_compute_preferences \
         WHERE user_id = ? AND gateway_id = ? ORDER BY position",
        &parent,
    )
    .await?;
    let plan = sync::plan(&stored, &profile.user_compute_resource_preferences, |p| {
        p.compute_resource_id.as_str()
    })?;
    for id in &plan.delete {
        sqlx::query(
            r"
            DELETE FROM user_compute_preferences
            WHERE user_id = ? AND gateway_id = ? AND compute_resource_id = ?
            ",
        )
        .bind(&key.user_id)
        .bind(&key.gateway_id)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    for (index, pref) in plan.update {
        write_compute_preference(conn, &key, index, pref, true).await?;
    }
    for (index, pref) in plan.insert {
        write_compute_preference(conn, &key, index, pref, false).await?;
    }

    let stored = stored_keys(
        conn,
        "SELECT storage_resource_id FROM user_storage_preferences \
         WHERE user_id = ? AND gateway_id = ? ORDER BY position",
        &parent,
    )
    .await?;
    let plan = sync::plan(&stored, &profile.user_storage_preferences, |p| {
        p.storage_resource_id.as_str()
    })?;
    for id in &plan.delete {
        sqlx::query(
            r"
            DELETE FROM user_storage_preferences
            WHERE user_id = ? AND gateway_id = ? AND storage_resource_id = ?
            ",
        )
        .bind(&key.user_id)
        .bind(&key.gateway_id)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    for (index, pref) in plan.update {
        write_storage_preference(conn, &key, index, pref, true).await?;
    }
    for (index, pref) in plan.insert {
        write_storage_preference(conn, &key, index, pref, false).await?;
    }
    Ok(())
}

async fn delete_preference(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    key: &UserProfileKey,
    resource_id: &str,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(&format!(
        "DELETE FROM {table} WHERE user_id = ? AND gateway_id = ? AND {column} = ?"
    ))
    .bind(&key.user_id)
    .bind(&key.gateway_id)
    .bind(resource_id)
    .execute(pool)
    .await
    .map_err(map_sqlx_error)?;
    ensure_affected(result.rows_affected(), || format!("preference {key}/{resource_id}"))
}

#[async_trait]
impl UserProfileRepository for SqliteUserProfileRepository {
    async fn insert(&self, profile: &UserResourceProfile) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(&format!(
            "INSERT INTO user_profiles ({PROFILE_COLUMNS}) VALUES (?, ?, ?, ?, ?)"
        ))
        .bind(&profile.user_id)
        .bind(&profile.gateway_id)
        .bind(&profile.credential_store_token)
        .bind(&profile.identity_server_tenant)
        .bind(&profile.identity_server_pwd_cred_token)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        sync_preferences(&mut tx, profile).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get(&self, key: &UserProfileKey) -> Result<UserResourceProfile, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = ? AND gateway_id = ?"
        ))
        .bind(&key.user_id)
        .bind(&key.gateway_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("user resource profile {key}")))?;

        hydrate(&mut conn, row).await
    }

    async fn update(&self, profile: &UserResourceProfile) -> Result<(), RepositoryError> {
        let key = profile.key();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r"
            UPDATE user_profiles
            SET credential_store_token = ?, identity_server_tenant = ?,
                identity_server_pwd_cred_token = ?
            WHERE user_id = ? AND gateway_id = ?
            ",
        )
        .bind(&profile.credential_store_token)
        .bind(&profile.identity_server_tenant)
        .bind(&profile.identity_server_pwd_cred_token)
        .bind(&key.user_id)
        .bind(&key.gateway_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("user resource profile {key}"))?;
        sync_preferences(&mut tx, profile).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete(&self, key: &UserProfileKey) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE user_id = ? AND gateway_id = ?")
            .bind(&key.user_id)
            .bind(&key.gateway_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("user resource profile {key}"))
    }

    async fn exists(&self, key: &UserProfileKey) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        row_exists(
            &mut conn,
            "SELECT EXISTS(SELECT 1 FROM user_profiles WHERE user_id = ? AND gateway_id = ?)",
            &[key.user_id.as_str(), key.gateway_id.as_str()],
        )
        .await
    }

    async fn list(&self) -> Result<Vec<UserResourceProfile>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles ORDER BY rowid"
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        let mut profiles = Vec::with_capacity(rows.len());
        for row in rows {
            profiles.push(hydrate(&mut conn, row).await?);
        }
        Ok(profiles)
    }

    async fn delete_compute_preference(
        &self,
        key: &UserProfileKey,
        compute_resource_id: &str,
    ) -> Result<(), RepositoryError> {
        delete_preference(
            &self.pool,
            "user_compute_preferences",
            "compute_resource_id",
            key,
            compute_resource_id,
        )
        .await
    }

    async fn delete_storage_preference(
        &self,
        key: &UserProfileKey,
        storage_resource_id: &str,
    ) -> Result<(), RepositoryError> {
        delete_preference(
            &self.pool,
            "user_storage_preferences",
            "storage_resource_id",
            key,
            storage_resource_id,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    fn profile() -> UserResourceProfile {
        UserResourceProfile {
            credential_store_token: Some("user-token".to_string()),
            user_compute_resource_preferences: vec![
                UserComputeResourcePreference {
                    compute_resource_id: "c1".to_string(),
                    login_user_name: Some("alice".to_string()),
                    resource_specific_credential_store_token: Some("tok".to_string()),
                    validated: true,
                    ..UserComputeResourcePreference::default()
                },
                UserComputeResourcePreference {
                    compute_resource_id: "c2".to_string(),
                    ..UserComputeResourcePreference::default()
                },
            ],
            user_storage_preferences: vec![UserStoragePreference {
                storage_resource_id: "s1".to_string(),
                file_system_root_location: Some("/home/alice".to_string()),
                ..UserStoragePreference::default()
            }],
            ..UserResourceProfile::new("alice", "gw")
        }
    }

    async fn repo() -> SqliteUserProfileRepository {
        SqliteUserProfileRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_round_trip_and_duplicate() {
        let repo = repo().await;
        let p = profile();
        repo.insert(&p).await.unwrap();

        assert_eq!(repo.get(&p.key()).await.unwrap(), p);
        assert!(matches!(repo.insert(&p).await.unwrap_err(), RepositoryError::AlreadyExists(_)));

        // Same user on another gateway is a different profile.
        repo.insert(&UserResourceProfile::new("alice", "gw2")).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_clears_token_and_drops_orphans() {
        let repo = repo().await;
        let mut p = profile();
        repo.insert(&p).await.unwrap();

        p.user_compute_resource_preferences[0].resource_specific_credential_store_token = None;
        p.user_compute_resource_preferences.truncate(1);
        p.user_storage_preferences.clear();
        repo.update(&p).await.unwrap();

        let stored = repo.get(&p.key()).await.unwrap();
        assert_eq!(stored, p);
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let repo = repo().await;
        let key = UserProfileKey::new("nobody", "gw");

        assert!(matches!(repo.get(&key).await.unwrap_err(), RepositoryError::NotFound(_)));
        assert!(matches!(repo.delete(&key).await.unwrap_err(), RepositoryError::NotFound(_)));
        assert!(matches!(
            repo.update(&UserResourceProfile::new("nobody", "gw")).await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
        assert!(!repo.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_single_preference() {
        let repo = repo().await;
        let p = profile();
        repo.insert(&p).await.unwrap();

        repo.delete_compute_preference(&p.key(), "c2").await.unwrap();
        repo.delete_storage_preference(&p.key(), "s1").await.unwrap();
        assert!(matches!(
            repo.delete_storage_preference(&p.key(), "s1").await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));

        let stored = repo.get(&p.key()).await.unwrap();
        assert_eq!(stored.user_compute_resource_preferences.len(), 1);
        assert!(stored.user_storage_preferences.is_empty());
    }
}
