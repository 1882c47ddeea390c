//! `SQLite` implementation of the gateway resource profile repository.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use appcat_core::domain::{ComputeResourcePreference, GatewayResourceProfile, StoragePreference};
use appcat_core::ports::GatewayProfileRepository;
use appcat_core::sync;
use appcat_core::RepositoryError;

use super::row_mappers::{
    ensure_affected, map_sqlx_error, parse_optional_tag, position, row_exists, stored_keys,
};

/// `SQLite` implementation of the gateway resource profile repository.
pub struct SqliteGatewayProfileRepository {
    pool: SqlitePool,
}

impl SqliteGatewayProfileRepository {
    /// Create a new `SQLite` gateway profile repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    gateway_id: String,
    credential_store_token: Option<String>,
    identity_server_tenant: Option<String>,
    identity_server_pwd_cred_token: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ComputePreferenceRow {
    compute_resource_id: String,
    override_by_airavata: bool,
    login_user_name: Option<String>,
    preferred_job_submission_protocol: Option<String>,
    preferred_data_movement_protocol: Option<String>,
    preferred_batch_queue: Option<String>,
    scratch_location: Option<String>,
    allocation_project_number: Option<String>,
    resource_specific_credential_store_token: Option<String>,
    usage_reporting_gateway_id: Option<String>,
    quality_of_service: Option<String>,
    reservation: Option<String>,
    reservation_start_time: Option<i64>,
    reservation_end_time: Option<i64>,
}

impl ComputePreferenceRow {
    fn into_domain(self) -> Result<ComputeResourcePreference, RepositoryError> {
        Ok(ComputeResourcePreference {
            preferred_job_submission_protocol: parse_optional_tag(
                self.preferred_job_submission_protocol.as_deref(),
            )?,
            preferred_data_movement_protocol: parse_optional_tag(
                self.preferred_data_movement_protocol.as_deref(),
            )?,
            compute_resource_id: self.compute_resource_id,
            override_by_airavata: self.override_by_airavata,
            login_user_name: self.login_user_name,
            preferred_batch_queue: self.preferred_batch_queue,
            scratch_location: self.scratch_location,
            allocation_project_number: self.allocation_project_number,
            resource_specific_credential_store_token: self
                .resource_specific_credential_store_token,
            usage_reporting_gateway_id: self.usage_reporting_gateway_id,
            quality_of_service: self.quality_of_service,
            reservation: self.reservation,
            reservation_start_time: self.reservation_start_time,
            reservation_end_time: self.reservation_end_time,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoragePreferenceRow {
    storage_resource_id: String,
    login_user_name: Option<String>,
    file_system_root_location: Option<String>,
    resource_specific_credential_store_token: Option<String>,
}

impl From<StoragePreferenceRow> for StoragePreference {
    fn from(row: StoragePreferenceRow) -> Self {
        Self {
            storage_resource_id: row.storage_resource_id,
            login_user_name: row.login_user_name,
            file_system_root_location: row.file_system_root_location,
            resource_specific_credential_store_token: row.resource_specific_credential_store_token,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn hydrate(
    conn: &mut SqliteConnection,
    row: ProfileRow,
) -> Result<GatewayResourceProfile, RepositoryError> {
    let compute_resource_preferences = sqlx::query_as::<_, ComputePreferenceRow>(
        r"
        SELECT compute_resource_id, override_by_airavata, login_user_name,
               preferred_job_submission_protocol, preferred_data_movement_protocol,
               preferred_batch_queue, scratch_location, allocation_project_number,
               resource_specific_credential_store_token, usage_reporting_gateway_id,
               quality_of_service, reservation, reservation_start_time, reservation_end_time
        FROM gateway_compute_preferences WHERE gateway_id = ? ORDER BY position
        ",
    )
    .bind(&row.gateway_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(ComputePreferenceRow::into_domain)
    .collect::<Result<_, _>>()?;

    let storage_preferences = sqlx::query_as::<_, StoragePreferenceRow>(
        r"
        SELECT storage_resource_id, login_user_name, file_system_root_location,
               resource_specific_credential_store_token
        FROM gateway_storage_preferences WHERE gateway_id = ? ORDER BY position
        ",
    )
    .bind(&row.gateway_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(StoragePreference::from)
    .collect();

    Ok(GatewayResourceProfile {
        gateway_id: row.gateway_id,
        credential_store_token: row.credential_store_token,
        compute_resource_preferences,
        storage_preferences,
        identity_server_tenant: row.identity_server_tenant,
        identity_server_pwd_cred_token: row.identity_server_pwd_cred_token,
    })
}

/// Write every column, so `None` clears what was stored.
async fn write_compute_preference(
    conn: &mut SqliteConnection,
    gateway_id: &str,
    index: usize,
    pref: &ComputeResourcePreference,
    existing: bool,
) -> Result<(), RepositoryError> {
    let sql = if existing {
        r"
        UPDATE gateway_compute_preferences
        SET position = ?, override_by_airavata = ?, login_user_name = ?,
            preferred_job_submission_protocol = ?, preferred_data_movement_protocol = ?,
            preferred_batch_queue = ?, scratch_location = ?, allocation_project_number = ?,
            resource_specific_credential_store_token = ?, usage_reporting_gateway_id = ?,
            quality_of_service = ?, reservation = ?, reservation_start_time = ?,
            reservation_end_time = ?
        WHERE gateway_id = ? AND compute_resource_id = ?
        "
    } else {
        r"
        INSERT INTO gateway_compute_preferences (
            position, override_by_airavata, login_user_name,
            preferred_job_submission_protocol, preferred_data_movement_protocol,
            preferred_batch_queue, scratch_location, allocation_project_number,
            resource_specific_credential_store_token, usage_reporting_gateway_id,
            quality_of_service, reservation, reservation_start_time, reservation_end_time,
            gateway_id, compute_resource_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "
    };

    sqlx::query(sql)
        .bind(position(index))
        .bind(pref.override_by_airavata)
        .bind(&pref.login_user_name)
        .bind(pref.preferred_job_submission_protocol.map(|p| p.as_str()))
        .bind(pref.preferred_data_movement_protocol.map(|p| p.as_str()))
        .bind(&pref.preferred_batch_queue)
        .bind(&pref.scratch_location)
        .bind(&pref.allocation_project_number)
        .bind(&pref.resource_specific_credential_store_token)
        .bind(&pref.usage_reporting_gateway_id)
        .bind(&pref.quality_of_service)
        .bind(&pref.reservation)
        .bind(pref.reservation_start_time)
        .bind(pref.reservation_end_time)
        .bind(gateway_id)
        .bind(&pref.compute_resource_id)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

async fn write_storage_preference(
    conn: &mut SqliteConnection,
    gateway_id: &str,
    index: usize,
    pref: &StoragePreference,
    existing: bool,
) -> Result<(), RepositoryError> {
    let sql = if existing {
        r"
        UPDATE gateway_storage_preferences
        SET position = ?, login_user_name = ?, file_system_root_location = ?,
            resource_specific_credential_store_token = ?
        WHERE gateway_id = ? AND storage_resource_id = ?
        "
    } else {
        r"
        INSERT INTO gateway_storage_preferences (
            position, login_user_name, file_system_root_location,
            resource_specific_credential_store_token, gateway_id, storage_resource_id
        ) VALUES (?, ?, ?, ?, ?, ?)
        "
    };

    sqlx::query(sql)
        .bind(position(index))
        .bind(&pref.login_user_name)
        .bind(&pref.file_system_root_location)
        .bind(&pref.resource_specific_credential_store_token)
        .bind(gateway_id)
        .bind(&pref.storage_resource_id)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

async fn sync_preferences(
    conn: &mut SqliteConnection,
    profile: &GatewayResourceProfile,
) -> Result<(), RepositoryError> {
    let gateway_id = profile.gateway_id.as_str();

    let stored = stored_keys(
        conn,
        "SELECT compute_resource_id FROM gateway_compute_preferences \
         WHERE gateway_id = ? ORDER BY position",
        &[gateway_id],
    )
    .await?;
    let plan = sync::plan(&stored, &profile.compute_resource_preferences, |p| {
        p.compute_resource_id.as_str()
    })?;
    for id in &plan.delete {
        sqlx::query(
            "DELETE FROM gateway_compute_preferences WHERE gateway_id = ? AND compute_resource_id = ?",
        )
        .bind(gateway_id)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    for (index, pref) in plan.update {
        write_compute_preference(conn, gateway_id, index, pref, true).await?;
    }
    for (index, pref) in plan.insert {
        write_compute_preference(conn, gateway_id, index, pref, false).await?;
    }

    let stored = stored_keys(
        conn,
        "SELECT storage_resource_id FROM gateway_storage_preferences \
         WHERE gateway_id = ? ORDER BY position",
        &[gateway_id],
    )
    .await?;
    let plan = sync::plan(&stored, &profile.storage_preferences, |p| {
        p.storage_resource_id.as_str()
    })?;
    for id in &plan.delete {
        sqlx::query(
            "DELETE FROM gateway_storage_preferences WHERE gateway_id = ? AND storage_resource_id = ?",
        )
        .bind(gateway_id)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    for (index, pref) in plan.update {
        write_storage_preference(conn, gateway_id, index, pref, true).await?;
    }
    for (index, pref) in plan.insert {
        write_storage_preference(conn, gateway_id, index, pref, false).await?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl GatewayProfileRepository for SqliteGatewayProfileRepository {
    async fn insert(&self, profile: &GatewayResourceProfile) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r"
            INSERT INTO gateway_profiles (
                gateway_id, credential_store_token, identity_server_tenant,
                identity_server_pwd_cred_token
            ) VALUES (?, ?, ?, ?)
            ",
        )
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

    async fn get(&self, gateway_id: &str) -> Result<GatewayResourceProfile, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT gateway_id, credential_store_token, identity_server_tenant,
                   identity_server_pwd_cred_token
            FROM gateway_profiles WHERE gateway_id = ?
            ",
        )
        .bind(gateway_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("gateway profile {gateway_id}")))?;

        hydrate(&mut conn, row).await
    }

    async fn update(&self, profile: &GatewayResourceProfile) -> Result<(), RepositoryError> {
        let gateway_id = profile.gateway_id.as_str();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r"
            UPDATE gateway_profiles
            SET credential_store_token = ?, identity_server_tenant = ?,
                identity_server_pwd_cred_token = ?
            WHERE gateway_id = ?
            ",
        )
        .bind(&profile.credential_store_token)
        .bind(&profile.identity_server_tenant)
        .bind(&profile.identity_server_pwd_cred_token)
        .bind(gateway_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("gateway profile {gateway_id}"))?;
        sync_preferences(&mut tx, profile).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete(&self, gateway_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM gateway_profiles WHERE gateway_id = ?")
            .bind(gateway_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("gateway profile {gateway_id}"))
    }

    async fn exists(&self, gateway_id: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        row_exists(
            &mut conn,
            "SELECT EXISTS(SELECT 1 FROM gateway_profiles WHERE gateway_id = ?)",
            &[gateway_id],
        )
        .await
    }

    async fn list(&self) -> Result<Vec<GatewayResourceProfile>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let rows = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT gateway_id, credential_store_token, identity_server_tenant,
                   identity_server_pwd_cred_token
            FROM gateway_profiles ORDER BY rowid
            ",
        )
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
        gateway_id: &str,
        compute_resource_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM gateway_compute_preferences WHERE gateway_id = ? AND compute_resource_id = ?",
        )
        .bind(gateway_id)
        .bind(compute_resource_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || {
            format!("compute preference {gateway_id}/{compute_resource_id}")
        })
    }

    async fn delete_storage_preference(
        &self,
        gateway_id: &str,
        storage_resource_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM gateway_storage_preferences WHERE gateway_id = ? AND storage_resource_id = ?",
        )
        .bind(gateway_id)
        .bind(storage_resource_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || {
            format!("storage preference {gateway_id}/{storage_resource_id}")
        })
    }
}
