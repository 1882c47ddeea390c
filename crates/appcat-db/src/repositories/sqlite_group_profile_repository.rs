//! `SQLite` implementation of the group resource profile repository.
//!
//! A profile owns three child collections plus the reservations hanging off
//! each compute preference. `update` diffs every collection against what is
//! stored, inside one transaction.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use appcat_core::domain::{
    BatchQueueResourcePolicy, ComputeResourcePolicy, ComputeResourceReservation,
    GroupComputeResourcePreference, GroupResourceProfile,
};
use appcat_core::ports::GroupProfileRepository;
use appcat_core::sync;
use appcat_core::RepositoryError;

use super::row_mappers::{
    decode_list, encode_list, ensure_affected, format_timestamp, map_sqlx_error,
    parse_optional_tag, parse_timestamp, position, push_in_list, row_exists, stored_keys,
};

const PROFILE_COLUMNS: &str = "group_resource_profile_id, gateway_id, \
     group_resource_profile_name, default_credential_store_token, creation_time, updated_time";

const PREFERENCE_COLUMNS: &str = "compute_resource_id, group_resource_profile_id, \
     override_by_airavata, login_user_name, preferred_job_submission_protocol, \
     preferred_data_movement_protocol, preferred_batch_queue, scratch_location, \
     allocation_project_number, resource_specific_credential_store_token, \
     usage_reporting_gateway_id, quality_of_service";

const COMPUTE_POLICY_COLUMNS: &str =
    "resource_policy_id, compute_resource_id, group_resource_profile_id, allowed_batch_queues";

const BATCH_QUEUE_POLICY_COLUMNS: &str = "resource_policy_id, compute_resource_id, \
     group_resource_profile_id, queuename, max_allowed_nodes, max_allowed_cores, \
     max_allowed_walltime";

/// `SQLite` implementation of the group resource profile repository.
pub struct SqliteGroupProfileRepository {
    pool: SqlitePool,
}

impl SqliteGroupProfileRepository {
    /// Create a new `SQLite` group profile repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ProfileRow {
    group_resource_profile_id: String,
    gateway_id: String,
    group_resource_profile_name: Option<String>,
    default_credential_store_token: Option<String>,
    creation_time: Option<String>,
    updated_time: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PreferenceRow {
    compute_resource_id: String,
    group_resource_profile_id: String,
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
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    reservation_id: String,
    reservation_name: String,
    start_time: i64,
    end_time: i64,
    queue_names: String,
}

impl TryFrom<ReservationRow> for ComputeResourceReservation {
    type Error = RepositoryError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            queue_names: decode_list(&row.queue_names)?,
            reservation_id: row.reservation_id,
            reservation_name: row.reservation_name,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ComputePolicyRow {
    resource_policy_id: String,
    compute_resource_id: String,
    group_resource_profile_id: String,
    allowed_batch_queues: String,
}

impl TryFrom<ComputePolicyRow> for ComputeResourcePolicy {
    type Error = RepositoryError;

    fn try_from(row: ComputePolicyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            allowed_batch_queues: decode_list(&row.allowed_batch_queues)?,
            resource_policy_id: row.resource_policy_id,
            compute_resource_id: row.compute_resource_id,
            group_resource_profile_id: row.group_resource_profile_id,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BatchQueuePolicyRow {
    resource_policy_id: String,
    compute_resource_id: String,
    group_resource_profile_id: String,
    queuename: Option<String>,
    max_allowed_nodes: Option<i32>,
    max_allowed_cores: Option<i32>,
    max_allowed_walltime: Option<i32>,
}

impl From<BatchQueuePolicyRow> for BatchQueueResourcePolicy {
    fn from(row: BatchQueuePolicyRow) -> Self {
        Self {
            resource_policy_id: row.resource_policy_id,
            compute_resource_id: row.compute_resource_id,
            group_resource_profile_id: row.group_resource_profile_id,
            queuename: row.queuename,
            max_allowed_nodes: row.max_allowed_nodes,
            max_allowed_cores: row.max_allowed_cores,
            max_allowed_walltime: row.max_allowed_walltime,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn load_preference(
    conn: &mut SqliteConnection,
    row: PreferenceRow,
) -> Result<GroupComputeResourcePreference, RepositoryError> {
    let reservations = sqlx::query_as::<_, ReservationRow>(
        r"
        SELECT reservation_id, reservation_name, start_time, end_time, queue_names
        FROM group_reservations
        WHERE group_resource_profile_id = ? AND compute_resource_id = ?
        ORDER BY position
        ",
    )
    .bind(&row.group_resource_profile_id)
    .bind(&row.compute_resource_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(ComputeResourceReservation::try_from)
    .collect::<Result<_, _>>()?;

    Ok(GroupComputeResourcePreference {
        preferred_job_submission_protocol: parse_optional_tag(
            row.preferred_job_submission_protocol.as_deref(),
        )?,
        preferred_data_movement_protocol: parse_optional_tag(
            row.preferred_data_movement_protocol.as_deref(),
        )?,
        compute_resource_id: row.compute_resource_id,
        group_resource_profile_id: row.group_resource_profile_id,
        override_by_airavata: row.override_by_airavata,
        login_user_name: row.login_user_name,
        preferred_batch_queue: row.preferred_batch_queue,
        scratch_location: row.scratch_location,
        allocation_project_number: row.allocation_project_number,
        resource_specific_credential_store_token: row.resource_specific_credential_store_token,
        usage_reporting_gateway_id: row.usage_reporting_gateway_id,
        quality_of_service: row.quality_of_service,
        reservations,
    })
}

async fn load_preferences(
    conn: &mut SqliteConnection,
    profile_id: &str,
) -> Result<Vec<GroupComputeResourcePreference>, RepositoryError> {
    let rows = sqlx::query_as::<_, PreferenceRow>(&format!(
        "SELECT {PREFERENCE_COLUMNS} FROM group_compute_preferences \
         WHERE group_resource_profile_id = ? ORDER BY position"
    ))
    .bind(profile_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let mut preferences = Vec::with_capacity(rows.len());
    for row in rows {
        preferences.push(load_preference(conn, row).await?);
    }
    Ok(preferences)
}

async fn load_compute_policies(
    conn: &mut SqliteConnection,
    profile_id: &str,
) -> Result<Vec<ComputeResourcePolicy>, RepositoryError> {
    sqlx::query_as::<_, ComputePolicyRow>(&format!(
        "SELECT {COMPUTE_POLICY_COLUMNS} FROM group_compute_policies \
         WHERE group_resource_profile_id = ? ORDER BY position"
    ))
    .bind(profile_id)
    .fetch_all(conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(ComputeResourcePolicy::try_from)
    .collect()
}

async fn load_batch_queue_policies(
    conn: &mut SqliteConnection,
    profile_id: &str,
) -> Result<Vec<BatchQueueResourcePolicy>, RepositoryError> {
    let rows = sqlx::query_as::<_, BatchQueuePolicyRow>(&format!(
        "SELECT {BATCH_QUEUE_POLICY_COLUMNS} FROM group_batch_queue_policies \
         WHERE group_resource_profile_id = ? ORDER BY position"
    ))
    .bind(profile_id)
    .fetch_all(conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(rows.into_iter().map(BatchQueueResourcePolicy::from).collect())
}

async fn hydrate(
    conn: &mut SqliteConnection,
    row: ProfileRow,
) -> Result<GroupResourceProfile, RepositoryError> {
    let id = row.group_resource_profile_id.as_str();
    let compute_preferences = load_preferences(conn, id).await?;
    let compute_resource_policies = load_compute_policies(conn, id).await?;
    let batch_queue_resource_policies = load_batch_queue_policies(conn, id).await?;

    Ok(GroupResourceProfile {
        creation_time: parse_timestamp(row.creation_time.as_deref())?,
        updated_time: parse_timestamp(row.updated_time.as_deref())?,
        gateway_id: row.gateway_id,
        group_resource_profile_id: row.group_resource_profile_id,
        group_resource_profile_name: row.group_resource_profile_name,
        compute_preferences,
        compute_resource_policies,
        batch_queue_resource_policies,
        default_credential_store_token: row.default_credential_store_token,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Write helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn write_preference(
    conn: &mut SqliteConnection,
    profile_id: &str,
    index: usize,
    pref: &GroupComputeResourcePreference,
    existing: bool,
) -> Result<(), RepositoryError> {
    let sql = if existing {
        r"
        UPDATE group_compute_preferences
        SET position = ?, override_by_airavata = ?, login_user_name = ?,
            preferred_job_submission_protocol = ?, preferred_data_movement_protocol = ?,
            preferred_batch_queue = ?, scratch_location = ?, allocation_project_number = ?,
            resource_specific_credential_store_token = ?, usage_reporting_gateway_id = ?,
            quality_of_service = ?
        WHERE group_resource_profile_id = ? AND compute_resource_id = ?
        "
    } else {
        r"
        INSERT INTO group_compute_preferences (
            position, override_by_airavata, login_user_name,
            preferred_job_submission_protocol, preferred_data_movement_protocol,
            preferred_batch_queue, scratch_location, allocation_project_number,
            resource_specific_credential_store_token, usage_reporting_gateway_id,
            quality_of_service, group_resource_profile_id, compute_resource_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
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
        .bind(profile_id)
        .bind(&pref.compute_resource_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    sync_reservations(conn, profile_id, pref).await
}

async fn sync_reservations(
    conn: &mut SqliteConnection,
    profile_id: &str,
    pref: &GroupComputeResourcePreference,
) -> Result<(), RepositoryError> {
    let resource_id = pref.compute_resource_id.as_str();
    let stored = stored_keys(
        conn,
        "SELECT reservation_id FROM group_reservations \
         WHERE group_resource_profile_id = ? AND compute_resource_id = ? ORDER BY position",
        &[profile_id, resource_id],
    )
    .await?;
    let plan = sync::plan(&stored, &pref.reservations, |r| r.reservation_id.as_str())?;

    for reservation_id in &plan.delete {
        sqlx::query(
            r"
            DELETE FROM group_reservations
            WHERE group_resource_profile_id = ? AND compute_resource_id = ? AND reservation_id = ?
            ",
        )
        .bind(profile_id)
        .bind(resource_id)
        .bind(reservation_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }

    let writes = plan
        .update
        .into_iter()
        .map(|w| (w, true))
        .chain(plan.insert.into_iter().map(|w| (w, false)));
    for ((index, reservation), existing) in writes {
        let sql = if existing {
            r"
            UPDATE group_reservations
            SET position = ?, reservation_name = ?, start_time = ?, end_time = ?, queue_names = ?
            WHERE group_resource_profile_id = ? AND compute_resource_id = ? AND reservation_id = ?
            "
        } else {
            r"
            INSERT INTO group_reservations (
                position, reservation_name, start_time, end_time, queue_names,
                group_resource_profile_id, compute_resource_id, reservation_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "
        };
        sqlx::query(sql)
            .bind(position(index))
            .bind(&reservation.reservation_name)
            .bind(reservation.start_time)
            .bind(reservation.end_time)
            .bind(encode_list(&reservation.queue_names)?)
            .bind(profile_id)
            .bind(resource_id)
            .bind(&reservation.reservation_id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }
    Ok(())
}

async fn sync_preferences(
    conn: &mut SqliteConnection,
    profile: &GroupResourceProfile,
) -> Result<(), RepositoryError> {
    let profile_id = profile.group_resource_profile_id.as_str();
    let stored = stored_keys(
        conn,
        "SELECT compute_resource_id FROM group_compute_preferences \
         WHERE group_resource_profile_id = ? ORDER BY position",
        &[profile_id],
    )
    .await?;
    let plan = sync::plan(&stored, &profile.compute_preferences, |p| {
        p.compute_resource_id.as_str()
    })?;

    for resource_id in &plan.delete {
        sqlx::query(
            r"
            DELETE FROM group_compute_preferences
            WHERE group_resource_profile_id = ? AND compute_resource_id = ?
            ",
        )
        .bind(profile_id)
        .bind(resource_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    for (index, pref) in plan.update {
        write_preference(conn, profile_id, index, pref, true).await?;
    }
    for (index, pref) in plan.insert {
        write_preference(conn, profile_id, index, pref, false).await?;
    }
    Ok(())
}

async fn sync_compute_policies(
    conn: &mut SqliteConnection,
    profile: &GroupResourceProfile,
) -> Result<(), RepositoryError> {
    let profile_id = profile.group_resource_profile_id.as_str();
    let stored = stored_keys(
        conn,
        "SELECT resource_policy_id FROM group_compute_policies \
         WHERE group_resource_profile_id = ? ORDER BY position",
        &[profile_id],
    )
    .await?;
    let plan = sync::plan(&stored, &profile.compute_resource_policies, |p| {
        p.resource_policy_id.as_str()
    })?;

    for policy_id in &plan.delete {
        sqlx::query("DELETE FROM group_compute_policies WHERE resource_policy_id = ?")
            .bind(policy_id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }

    let writes = plan
        .update
        .into_iter()
        .map(|w| (w, true))
        .chain(plan.insert.into_iter().map(|w| (w, false)));
    for ((index, policy), existing) in writes {
        let sql = if existing {
            r"
            UPDATE group_compute_policies
            SET position = ?, compute_resource_id = ?, allowed_batch_queues = ?,
                group_resource_profile_id = ?
            WHERE resource_policy_id = ?
            "
        } else {
            r"
            INSERT INTO group_compute_policies (
                position, compute_resource_id, allowed_batch_queues,
                group_resource_profile_id, resource_policy_id
            ) VALUES (?, ?, ?, ?, ?)
            "
        };
        sqlx::query(sql)
            .bind(position(index))
            .bind(&policy.compute_resource_id)
            .bind(encode_list(&policy.allowed_batch_queues)?)
            .bind(profile_id)
            .bind(&policy.resource_policy_id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }
    Ok(())
}

async fn sync_batch_queue_policies(
    conn: &mut SqliteConnection,
    profile: &GroupResourceProfile,
) -> Result<(), RepositoryError> {
    let profile_id = profile.group_resource_profile_id.as_str();
    let stored = stored_keys(
        conn,
        "SELECT resource_policy_id FROM group_batch_queue_policies \
         WHERE group_resource_profile_id = ? ORDER BY position",
        &[profile_id],
    )
    .await?;
    let plan = sync::plan(&stored, &profile.batch_queue_resource_policies, |p| {
        p.resource_policy_id.as_str()
    })?;

    for policy_id in &plan.delete {
        sqlx::query("DELETE FROM group_batch_queue_policies WHERE resource_policy_id = ?")
            .bind(policy_id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }

    let writes = plan
        .update
        .into_iter()
        .map(|w| (w, true))
        .chain(plan.insert.into_iter().map(|w| (w, false)));
    for ((index, policy), existing) in writes {
        let sql = if existing {
            r"
            UPDATE group_batch_queue_policies
            SET position = ?, compute_resource_id = ?, queuename = ?, max_allowed_nodes = ?,
                max_allowed_cores = ?, max_allowed_walltime = ?, group_resource_profile_id = ?
            WHERE resource_policy_id = ?
            "
        } else {
            r"
            INSERT INTO group_batch_queue_policies (
                position, compute_resource_id, queuename, max_allowed_nodes,
                max_allowed_cores, max_allowed_walltime, group_resource_profile_id,
                resource_policy_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "
        };
        sqlx::query(sql)
            .bind(position(index))
            .bind(&policy.compute_resource_id)
            .bind(&policy.queuename)
            .bind(policy.max_allowed_nodes)
            .bind(policy.max_allowed_cores)
            .bind(policy.max_allowed_walltime)
            .bind(profile_id)
            .bind(&policy.resource_policy_id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }
    Ok(())
}

async fn sync_children(
    conn: &mut SqliteConnection,
    profile: &GroupResourceProfile,
) -> Result<(), RepositoryError> {
    sync_preferences(conn, profile).await?;
    sync_compute_policies(conn, profile).await?;
    sync_batch_queue_policies(conn, profile).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl GroupProfileRepository for SqliteGroupProfileRepository {
    async fn insert(&self, profile: &GroupResourceProfile) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r"
            INSERT INTO group_profiles (
                group_resource_profile_id, gateway_id, group_resource_profile_name,
                default_credential_store_token, creation_time, updated_time
            ) VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&profile.group_resource_profile_id)
        .bind(&profile.gateway_id)
        .bind(&profile.group_resource_profile_name)
        .bind(&profile.default_credential_store_token)
        .bind(format_timestamp(profile.creation_time))
        .bind(format_timestamp(profile.updated_time))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        sync_children(&mut tx, profile).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get(&self, id: &str) -> Result<GroupResourceProfile, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM group_profiles WHERE group_resource_profile_id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("group resource profile {id}")))?;

        hydrate(&mut conn, row).await
    }

    async fn update(&self, profile: &GroupResourceProfile) -> Result<(), RepositoryError> {
        let id = profile.group_resource_profile_id.as_str();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // creation_time is written once, by insert.
        let result = sqlx::query(
            r"
            UPDATE group_profiles
            SET gateway_id = ?, group_resource_profile_name = ?,
                default_credential_store_token = ?, updated_time = ?
            WHERE group_resource_profile_id = ?
            ",
        )
        .bind(&profile.gateway_id)
        .bind(&profile.group_resource_profile_name)
        .bind(&profile.default_credential_store_token)
        .bind(format_timestamp(profile.updated_time))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("group resource profile {id}"))?;
        sync_children(&mut tx, profile).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM group_profiles WHERE group_resource_profile_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("group resource profile {id}"))
    }

    async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        row_exists(
            &mut conn,
            "SELECT EXISTS(SELECT 1 FROM group_profiles WHERE group_resource_profile_id = ?)",
            &[id],
        )
        .await
    }

    async fn list(
        &self,
        gateway_id: &str,
        accessible_ids: &[String],
    ) -> Result<Vec<GroupResourceProfile>, RepositoryError> {
        if accessible_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {PROFILE_COLUMNS} FROM group_profiles"));
        query.push(" WHERE gateway_id = ").push_bind(gateway_id);
        query.push(" AND ");
        push_in_list(&mut query, "group_resource_profile_id", accessible_ids);
        query.push(" ORDER BY rowid");

        let rows = query
            .build_query_as::<ProfileRow>()
            .fetch_all(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;

        let mut profiles = Vec::with_capacity(rows.len());
        for row in rows {
            profiles.push(hydrate(&mut conn, row).await?);
        }
        Ok(profiles)
    }

    async fn get_compute_preference(
        &self,
        compute_resource_id: &str,
        group_profile_id: &str,
    ) -> Result<GroupComputeResourcePreference, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, PreferenceRow>(&format!(
            "SELECT {PREFERENCE_COLUMNS} FROM group_compute_preferences \
             WHERE compute_resource_id = ? AND group_resource_profile_id = ?"
        ))
        .bind(compute_resource_id)
        .bind(group_profile_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!(
                "group compute preference {group_profile_id}/{compute_resource_id}"
            ))
        })?;

        load_preference(&mut conn, row).await
    }

    async fn delete_compute_preference(
        &self,
        compute_resource_id: &str,
        group_profile_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM group_compute_preferences
            WHERE compute_resource_id = ? AND group_resource_profile_id = ?
            ",
        )
        .bind(compute_resource_id)
        .bind(group_profile_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || {
            format!("group compute preference {group_profile_id}/{compute_resource_id}")
        })
    }

    async fn list_compute_preferences(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<GroupComputeResourcePreference>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        load_preferences(&mut conn, group_profile_id).await
    }

    async fn get_compute_policy(
        &self,
        policy_id: &str,
    ) -> Result<ComputeResourcePolicy, RepositoryError> {
        sqlx::query_as::<_, ComputePolicyRow>(&format!(
            "SELECT {COMPUTE_POLICY_COLUMNS} FROM group_compute_policies \
             WHERE resource_policy_id = ?"
        ))
        .bind(policy_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("compute resource policy {policy_id}")))?
        .try_into()
    }

    async fn delete_compute_policy(&self, policy_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM group_compute_policies WHERE resource_policy_id = ?")
            .bind(policy_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || {
            format!("compute resource policy {policy_id}")
        })
    }

    async fn list_compute_policies(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<ComputeResourcePolicy>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        load_compute_policies(&mut conn, group_profile_id).await
    }

    async fn get_batch_queue_policy(
        &self,
        policy_id: &str,
    ) -> Result<BatchQueueResourcePolicy, RepositoryError> {
        sqlx::query_as::<_, BatchQueuePolicyRow>(&format!(
            "SELECT {BATCH_QUEUE_POLICY_COLUMNS} FROM group_batch_queue_policies \
             WHERE resource_policy_id = ?"
        ))
        .bind(policy_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(BatchQueueResourcePolicy::from)
        .ok_or_else(|| RepositoryError::NotFound(format!("batch queue policy {policy_id}")))
    }

    async fn delete_batch_queue_policy(&self, policy_id: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM group_batch_queue_policies WHERE resource_policy_id = ?")
                .bind(policy_id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("batch queue policy {policy_id}"))
    }

    async fn list_batch_queue_policies(
        &self,
        group_profile_id: &str,
    ) -> Result<Vec<BatchQueueResourcePolicy>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        load_batch_queue_policies(&mut conn, group_profile_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use chrono::{TimeZone, Utc};

    fn reservation(id: &str) -> ComputeResourceReservation {
        ComputeResourceReservation {
            reservation_id: id.to_string(),
            reservation_name: format!("{id}-name"),
            start_time: 1_700_000_000_000,
            end_time: 1_700_003_600_000,
            queue_names: vec!["normal".to_string()],
        }
    }

    fn preference(resource: &str) -> GroupComputeResourcePreference {
        GroupComputeResourcePreference {
            compute_resource_id: resource.to_string(),
            group_resource_profile_id: "grp".to_string(),
            login_user_name: Some("bob".to_string()),
            resource_specific_credential_store_token: Some("tok".to_string()),
            reservations: vec![reservation("r1")],
            ..GroupComputeResourcePreference::default()
        }
    }

    fn profile() -> GroupResourceProfile {
        GroupResourceProfile {
            gateway_id: "gw".to_string(),
            group_resource_profile_id: "grp".to_string(),
            group_resource_profile_name: Some("default".to_string()),
            compute_preferences: vec![preference("c1"), preference("c2")],
            compute_resource_policies: vec![ComputeResourcePolicy {
                resource_policy_id: "cp1".to_string(),
                compute_resource_id: "c1".to_string(),
                group_resource_profile_id: "grp".to_string(),
                allowed_batch_queues: vec!["normal".to_string(), "debug".to_string()],
            }],
            batch_queue_resource_policies: vec![BatchQueueResourcePolicy {
                resource_policy_id: "bq1".to_string(),
                compute_resource_id: "c1".to_string(),
                group_resource_profile_id: "grp".to_string(),
                queuename: Some("normal".to_string()),
                max_allowed_nodes: Some(4),
                ..BatchQueueResourcePolicy::default()
            }],
            creation_time: Utc.timestamp_millis_opt(1_700_000_000_000).single(),
            updated_time: Utc.timestamp_millis_opt(1_700_000_000_000).single(),
            ..GroupResourceProfile::default()
        }
    }

    async fn repo() -> SqliteGroupProfileRepository {
        SqliteGroupProfileRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_round_trip() {
        let repo = repo().await;
        let p = profile();
        repo.insert(&p).await.unwrap();

        assert_eq!(repo.get("grp").await.unwrap(), p);
        assert_eq!(repo.get_compute_preference("c2", "grp").await.unwrap(), preference("c2"));
        assert_eq!(
            repo.get_batch_queue_policy("bq1").await.unwrap(),
            p.batch_queue_resource_policies[0]
        );
    }

    #[tokio::test]
    async fn test_update_keeps_creation_time() {
        let repo = repo().await;
        let mut p = profile();
        repo.insert(&p).await.unwrap();
        let created = p.creation_time;

        p.creation_time = None;
        p.updated_time = Utc.timestamp_millis_opt(1_800_000_000_000).single();
        repo.update(&p).await.unwrap();

        let stored = repo.get("grp").await.unwrap();
        assert_eq!(stored.creation_time, created);
        assert_eq!(stored.updated_time, p.updated_time);
    }

    #[tokio::test]
    async fn test_update_diffs_every_collection() {
        let repo = repo().await;
        let mut p = profile();
        repo.insert(&p).await.unwrap();

        p.compute_preferences.remove(1);
        p.compute_preferences[0].resource_specific_credential_store_token = None;
        p.compute_preferences[0].reservations = vec![reservation("r2")];
        p.compute_resource_policies.clear();
        p.batch_queue_resource_policies[0].max_allowed_nodes = None;
        repo.update(&p).await.unwrap();

        let stored = repo.get("grp").await.unwrap();
        assert_eq!(stored, p);
        assert!(matches!(
            repo.get_compute_policy("cp1").await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
        let reservations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM group_reservations")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(reservations, 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_accessible_ids() {
        let repo = repo().await;
        repo.insert(&profile()).await.unwrap();
        let mut other = profile();
        other.group_resource_profile_id = "grp2".to_string();
        other.compute_resource_policies[0].resource_policy_id = "cp2".to_string();
        other.batch_queue_resource_policies[0].resource_policy_id = "bq2".to_string();
        other.stamp_children();
        repo.insert(&other).await.unwrap();

        let listed = repo.list("gw", &["grp2".to_string()]).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].group_resource_profile_id, "grp2");

        assert!(repo.list("gw", &[]).await.unwrap().is_empty());
        assert!(repo.list("elsewhere", &["grp".to_string()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_child_deletes() {
        let repo = repo().await;
        repo.insert(&profile()).await.unwrap();

        repo.delete_compute_preference("c1", "grp").await.unwrap();
        repo.delete_compute_policy("cp1").await.unwrap();
        repo.delete_batch_queue_policy("bq1").await.unwrap();

        assert_eq!(repo.list_compute_preferences("grp").await.unwrap(), vec![preference("c2")]);
        assert!(repo.list_compute_policies("grp").await.unwrap().is_empty());
        assert!(repo.list_batch_queue_policies("grp").await.unwrap().is_empty());
        assert!(matches!(
            repo.delete_batch_queue_policy("bq1").await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
        assert!(repo.list_compute_preferences("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_children() {
        let repo = repo().await;
        repo.insert(&profile()).await.unwrap();

        repo.delete("grp").await.unwrap();

        assert!(!repo.exists("grp").await.unwrap());
        for table in ["group_compute_preferences", "group_reservations", "group_compute_policies"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&repo.pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "{table}");
        }
    }
}
