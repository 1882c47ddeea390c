//! `SQLite` implementation of the submission and data movement config store.
//!
//! Each config type has its own table keyed by interface id. SSH and local
//! submissions reference a resource job manager row; writing one of those
//! submissions also writes the manager it carries. A manager a submission
//! stops pointing at is deleted once no other submission uses it.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use appcat_core::RepositoryError;
use appcat_core::domain::{
    CloudJobSubmission, GridFtpDataMovement, LocalDataMovement, LocalSubmission,
    ResourceJobManager, ScpDataMovement, SshJobSubmission, UnicoreDataMovement,
    UnicoreJobSubmission,
};
use appcat_core::ports::InterfaceConfigRepository;

use super::row_mappers::{
    decode_list, encode_list, ensure_affected, map_sqlx_error, parse_optional_tag, parse_tag,
};

/// `SQLite` implementation of the interface configuration repository.
pub struct SqliteInterfaceConfigRepository {
    pool: SqlitePool,
}

impl SqliteInterfaceConfigRepository {
    /// Create a new `SQLite` interface configuration repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal row types for database queries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ResourceJobManagerRow {
    resource_job_manager_id: String,
    resource_job_manager_type: String,
    push_monitoring_endpoint: Option<String>,
    job_manager_bin_path: Option<String>,
}

#[derive(sqlx::FromRow)]
struct SshJobSubmissionRow {
    job_submission_interface_id: String,
    security_protocol: String,
    resource_job_manager_id: String,
    alternative_ssh_host_name: Option<String>,
    ssh_port: Option<i32>,
    monitor_mode: Option<String>,
}

#[derive(sqlx::FromRow)]
struct LocalSubmissionRow {
    job_submission_interface_id: String,
    security_protocol: String,
    resource_job_manager_id: String,
}

#[derive(sqlx::FromRow)]
struct CloudJobSubmissionRow {
    job_submission_interface_id: String,
    security_protocol: String,
    node_id: String,
    executable_type: String,
    provider_name: String,
    user_account_name: String,
}

/// Shared by UNICORE submissions and data movements.
#[derive(sqlx::FromRow)]
struct UnicoreRow {
    interface_id: String,
    security_protocol: String,
    unicore_end_point_url: String,
}

#[derive(sqlx::FromRow)]
struct ScpDataMovementRow {
    data_movement_interface_id: String,
    security_protocol: String,
    alternative_scp_host_name: Option<String>,
    ssh_port: Option<i32>,
}

#[derive(sqlx::FromRow)]
struct GridFtpDataMovementRow {
    data_movement_interface_id: String,
    security_protocol: String,
    grid_ftp_end_points: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource job manager helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn load_manager(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<ResourceJobManager, RepositoryError> {
    let row = sqlx::query_as::<_, ResourceJobManagerRow>(
        r"
        SELECT resource_job_manager_id, resource_job_manager_type, push_monitoring_endpoint,
               job_manager_bin_path
        FROM resource_job_managers WHERE resource_job_manager_id = ?
        ",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .ok_or_else(|| RepositoryError::NotFound(format!("resource job manager {id}")))?;

    let commands = sqlx::query_as::<_, (String, String)>(
        "SELECT command_type, command FROM job_manager_commands WHERE resource_job_manager_id = ?",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(|(kind, command)| Ok((parse_tag(&kind)?, command)))
    .collect::<Result<_, RepositoryError>>()?;

    let prefixes = sqlx::query_as::<_, (String, String)>(
        "SELECT parallelism_type, prefix FROM parallelism_prefixes WHERE resource_job_manager_id = ?",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(|(kind, prefix)| Ok((parse_tag(&kind)?, prefix)))
    .collect::<Result<_, RepositoryError>>()?;

    Ok(ResourceJobManager {
        resource_job_manager_type: parse_tag(&row.resource_job_manager_type)?,
        resource_job_manager_id: row.resource_job_manager_id,
        push_monitoring_endpoint: row.push_monitoring_endpoint,
        job_manager_bin_path: row.job_manager_bin_path,
        job_manager_commands: commands,
        parallelism_prefix: prefixes,
    })
}

/// Rewrite the command and prefix maps of a manager.
async fn replace_manager_maps(
    conn: &mut SqliteConnection,
    manager: &ResourceJobManager,
) -> Result<(), RepositoryError> {
    let id = manager.resource_job_manager_id.as_str();
    for table in ["job_manager_commands", "parallelism_prefixes"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE resource_job_manager_id = ?"))
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }

    for (kind, command) in &manager.job_manager_commands {
        sqlx::query(
            "INSERT INTO job_manager_commands (resource_job_manager_id, command_type, command) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(kind.as_str())
        .bind(command)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    for (kind, prefix) in &manager.parallelism_prefix {
        sqlx::query(
            "INSERT INTO parallelism_prefixes (resource_job_manager_id, parallelism_type, prefix) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(kind.as_str())
        .bind(prefix)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ManagerWrite {
    Insert,
    Update,
    Upsert,
}

async fn write_manager(
    conn: &mut SqliteConnection,
    manager: &ResourceJobManager,
    mode: ManagerWrite,
) -> Result<(), RepositoryError> {
    let sql = match mode {
        ManagerWrite::Insert => {
            r"
            INSERT INTO resource_job_managers (
                resource_job_manager_type, push_monitoring_endpoint, job_manager_bin_path,
                resource_job_manager_id
            ) VALUES (?, ?, ?, ?)
            "
        }
        ManagerWrite::Update => {
            r"
            UPDATE resource_job_managers
            SET resource_job_manager_type = ?, push_monitoring_endpoint = ?,
                job_manager_bin_path = ?
            WHERE resource_job_manager_id = ?
            "
        }
        ManagerWrite::Upsert => {
            r"
            INSERT INTO resource_job_managers (
                resource_job_manager_type, push_monitoring_endpoint, job_manager_bin_path,
                resource_job_manager_id
            ) VALUES (?, ?, ?, ?)
            ON CONFLICT(resource_job_manager_id) DO UPDATE SET
                resource_job_manager_type = excluded.resource_job_manager_type,
                push_monitoring_endpoint = excluded.push_monitoring_endpoint,
                job_manager_bin_path = excluded.job_manager_bin_path
            "
        }
    };

    let result = sqlx::query(sql)
        .bind(manager.resource_job_manager_type.as_str())
        .bind(&manager.push_monitoring_endpoint)
        .bind(&manager.job_manager_bin_path)
        .bind(&manager.resource_job_manager_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    if mode == ManagerWrite::Update {
        ensure_affected(result.rows_affected(), || {
            format!("resource job manager {}", manager.resource_job_manager_id)
        })?;
    }

    replace_manager_maps(conn, manager).await
}

/// The manager id a submission row in `table` points at.
async fn stored_manager_id(
    conn: &mut SqliteConnection,
    table: &str,
    submission_id: &str,
) -> Result<Option<String>, RepositoryError> {
    sqlx::query_scalar::<_, String>(&format!(
        "SELECT resource_job_manager_id FROM {table} WHERE job_submission_interface_id = ?"
    ))
    .bind(submission_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_error)
}

/// Delete a manager that no submission references any more.
async fn drop_unreferenced_manager(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        DELETE FROM resource_job_managers
        WHERE resource_job_manager_id = ?
          AND NOT EXISTS (
              SELECT 1 FROM ssh_job_submissions WHERE resource_job_manager_id = ?
          )
          AND NOT EXISTS (
              SELECT 1 FROM local_submissions WHERE resource_job_manager_id = ?
          )
        ",
    )
    .bind(id)
    .bind(id)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}

/// Point a submission at its incoming manager, cleaning up the one it left.
async fn relink_manager(
    conn: &mut SqliteConnection,
    table: &str,
    submission_id: &str,
    manager: &ResourceJobManager,
) -> Result<(), RepositoryError> {
    let previous = stored_manager_id(conn, table, submission_id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("{table} {submission_id}")))?;
    write_manager(conn, manager, ManagerWrite::Upsert).await?;

    sqlx::query(&format!(
        "UPDATE {table} SET resource_job_manager_id = ? WHERE job_submission_interface_id = ?"
    ))
    .bind(&manager.resource_job_manager_id)
    .bind(submission_id)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    if previous != manager.resource_job_manager_id {
        drop_unreferenced_manager(conn, &previous).await?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl InterfaceConfigRepository for SqliteInterfaceConfigRepository {
    async fn insert_resource_job_manager(
        &self,
        manager: &ResourceJobManager,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        write_manager(&mut tx, manager, ManagerWrite::Insert).await?;
        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get_resource_job_manager(&self, id: &str) -> Result<ResourceJobManager, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        load_manager(&mut conn, id).await
    }

    async fn update_resource_job_manager(
        &self,
        manager: &ResourceJobManager,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        write_manager(&mut tx, manager, ManagerWrite::Update).await?;
        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete_resource_job_manager(&self, id: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM resource_job_managers WHERE resource_job_manager_id = ?")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("resource job manager {id}"))
    }

    // ── SSH job submission ──────────────────────────────────────────────────

    async fn insert_ssh_job_submission(
        &self,
        submission: &SshJobSubmission,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        write_manager(&mut tx, &submission.resource_job_manager, ManagerWrite::Upsert).await?;

        sqlx::query(
            r"
            INSERT INTO ssh_job_submissions (
                job_submission_interface_id, security_protocol, resource_job_manager_id,
                alternative_ssh_host_name, ssh_port, monitor_mode
            ) VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&submission.job_submission_interface_id)
        .bind(submission.security_protocol.as_str())
        .bind(&submission.resource_job_manager.resource_job_manager_id)
        .bind(&submission.alternative_ssh_host_name)
        .bind(submission.ssh_port)
        .bind(submission.monitor_mode.map(|m| m.as_str()))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get_ssh_job_submission(&self, id: &str) -> Result<SshJobSubmission, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, SshJobSubmissionRow>(
            r"
            SELECT job_submission_interface_id, security_protocol, resource_job_manager_id,
                   alternative_ssh_host_name, ssh_port, monitor_mode
            FROM ssh_job_submissions WHERE job_submission_interface_id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("ssh job submission {id}")))?;

        Ok(SshJobSubmission {
            resource_job_manager: load_manager(&mut conn, &row.resource_job_manager_id).await?,
            security_protocol: parse_tag(&row.security_protocol)?,
            monitor_mode: parse_optional_tag(row.monitor_mode.as_deref())?,
            job_submission_interface_id: row.job_submission_interface_id,
            alternative_ssh_host_name: row.alternative_ssh_host_name,
            ssh_port: row.ssh_port,
        })
    }

    async fn update_ssh_job_submission(
        &self,
        submission: &SshJobSubmission,
    ) -> Result<(), RepositoryError> {
        let id = submission.job_submission_interface_id.as_str();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        relink_manager(&mut tx, "ssh_job_submissions", id, &submission.resource_job_manager)
            .await?;

        sqlx::query(
            r"
            UPDATE ssh_job_submissions
            SET security_protocol = ?, alternative_ssh_host_name = ?, ssh_port = ?,
                monitor_mode = ?
            WHERE job_submission_interface_id = ?
            ",
        )
        .bind(submission.security_protocol.as_str())
        .bind(&submission.alternative_ssh_host_name)
        .bind(submission.ssh_port)
        .bind(submission.monitor_mode.map(|m| m.as_str()))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    // ── Local submission ────────────────────────────────────────────────────

    async fn insert_local_submission(
        &self,
        submission: &LocalSubmission,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        write_manager(&mut tx, &submission.resource_job_manager, ManagerWrite::Upsert).await?;

        sqlx::query(
            r"
            INSERT INTO local_submissions (
                job_submission_interface_id, security_protocol, resource_job_manager_id
            ) VALUES (?, ?, ?)
            ",
        )
        .bind(&submission.job_submission_interface_id)
        .bind(submission.security_protocol.as_str())
        .bind(&submission.resource_job_manager.resource_job_manager_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get_local_submission(&self, id: &str) -> Result<LocalSubmission, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, LocalSubmissionRow>(
            r"
            SELECT job_submission_interface_id, security_protocol, resource_job_manager_id
            FROM local_submissions WHERE job_submission_interface_id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("local submission {id}")))?;

        Ok(LocalSubmission {
            resource_job_manager: load_manager(&mut conn, &row.resource_job_manager_id).await?,
            security_protocol: parse_tag(&row.security_protocol)?,
            job_submission_interface_id: row.job_submission_interface_id,
        })
    }

    async fn update_local_submission(
        &self,
        submission: &LocalSubmission,
    ) -> Result<(), RepositoryError> {
        let id = submission.job_submission_interface_id.as_str();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        relink_manager(&mut tx, "local_submissions", id, &submission.resource_job_manager).await?;

        sqlx::query(
            "UPDATE local_submissions SET security_protocol = ? WHERE job_submission_interface_id = ?",
        )
        .bind(submission.security_protocol.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    // ── Cloud job submission ────────────────────────────────────────────────

    async fn insert_cloud_job_submission(
        &self,
        submission: &CloudJobSubmission,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cloud_job_submissions (
                security_protocol, node_id, executable_type, provider_name, user_account_name,
                job_submission_interface_id
            ) VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(submission.security_protocol.as_str())
        .bind(&submission.node_id)
        .bind(&submission.executable_type)
        .bind(submission.provider_name.as_str())
        .bind(&submission.user_account_name)
        .bind(&submission.job_submission_interface_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_cloud_job_submission(
        &self,
        id: &str,
    ) -> Result<CloudJobSubmission, RepositoryError> {
        let row = sqlx::query_as::<_, CloudJobSubmissionRow>(
            r"
            SELECT job_submission_interface_id, security_protocol, node_id, executable_type,
                   provider_name, user_account_name
            FROM cloud_job_submissions WHERE job_submission_interface_id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("cloud job submission {id}")))?;

        Ok(CloudJobSubmission {
            security_protocol: parse_tag(&row.security_protocol)?,
            provider_name: parse_tag(&row.provider_name)?,
            job_submission_interface_id: row.job_submission_interface_id,
            node_id: row.node_id,
            executable_type: row.executable_type,
            user_account_name: row.user_account_name,
        })
    }

    async fn update_cloud_job_submission(
        &self,
        submission: &CloudJobSubmission,
    ) -> Result<(), RepositoryError> {
        let id = submission.job_submission_interface_id.as_str();
        let result = sqlx::query(
            r"
            UPDATE cloud_job_submissions
            SET security_protocol = ?, node_id = ?, executable_type = ?, provider_name = ?,
                user_account_name = ?
            WHERE job_submission_interface_id = ?
            ",
        )
        .bind(submission.security_protocol.as_str())
        .bind(&submission.node_id)
        .bind(&submission.executable_type)
        .bind(submission.provider_name.as_str())
        .bind(&submission.user_account_name)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("cloud job submission {id}"))
    }

    // ── UNICORE job submission ──────────────────────────────────────────────

    async fn insert_unicore_job_submission(
        &self,
        submission: &UnicoreJobSubmission,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO unicore_job_submissions (
                security_protocol, unicore_end_point_url, job_submission_interface_id
            ) VALUES (?, ?, ?)
            ",
        )
        .bind(submission.security_protocol.as_str())
        .bind(&submission.unicore_end_point_url)
        .bind(&submission.job_submission_interface_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_unicore_job_submission(
        &self,
        id: &str,
    ) -> Result<UnicoreJobSubmission, RepositoryError> {
        let row = sqlx::query_as::<_, UnicoreRow>(
            r"
            SELECT job_submission_interface_id AS interface_id, security_protocol,
                   unicore_end_point_url
            FROM unicore_job_submissions WHERE job_submission_interface_id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("unicore job submission {id}")))?;

        Ok(UnicoreJobSubmission {
            security_protocol: parse_tag(&row.security_protocol)?,
            job_submission_interface_id: row.interface_id,
            unicore_end_point_url: row.unicore_end_point_url,
        })
    }

    async fn update_unicore_job_submission(
        &self,
        submission: &UnicoreJobSubmission,
    ) -> Result<(), RepositoryError> {
        let id = submission.job_submission_interface_id.as_str();
        let result = sqlx::query(
            r"
            UPDATE unicore_job_submissions SET security_protocol = ?, unicore_end_point_url = ?
            WHERE job_submission_interface_id = ?
            ",
        )
        .bind(submission.security_protocol.as_str())
        .bind(&submission.unicore_end_point_url)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("unicore job submission {id}"))
    }

    // ── SCP data movement ───────────────────────────────────────────────────

    async fn insert_scp_data_movement(
        &self,
        movement: &ScpDataMovement,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO scp_data_movements (
                security_protocol, alternative_scp_host_name, ssh_port, data_movement_interface_id
            ) VALUES (?, ?, ?, ?)
            ",
        )
        .bind(movement.security_protocol.as_str())
        .bind(&movement.alternative_scp_host_name)
        .bind(movement.ssh_port)
        .bind(&movement.data_movement_interface_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_scp_data_movement(&self, id: &str) -> Result<ScpDataMovement, RepositoryError> {
        let row = sqlx::query_as::<_, ScpDataMovementRow>(
            r"
            SELECT data_movement_interface_id, security_protocol, alternative_scp_host_name, ssh_port
            FROM scp_data_movements WHERE data_movement_interface_id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("scp data movement {id}")))?;

        Ok(ScpDataMovement {
            security_protocol: parse_tag(&row.security_protocol)?,
            data_movement_interface_id: row.data_movement_interface_id,
            alternative_scp_host_name: row.alternative_scp_host_name,
            ssh_port: row.ssh_port,
        })
    }

    async fn update_scp_data_movement(
        &self,
        movement: &ScpDataMovement,
    ) -> Result<(), RepositoryError> {
        let id = movement.data_movement_interface_id.as_str();
        let result = sqlx::query(
            r"
            UPDATE scp_data_movements
            SET security_protocol = ?, alternative_scp_host_name = ?, ssh_port = ?
            WHERE data_movement_interface_id = ?
            ",
        )
        .bind(movement.security_protocol.as_str())
        .bind(&movement.alternative_scp_host_name)
        .bind(movement.ssh_port)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("scp data movement {id}"))
    }

    // ── GridFTP data movement ───────────────────────────────────────────────

    async fn insert_grid_ftp_data_movement(
        &self,
        movement: &GridFtpDataMovement,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO gridftp_data_movements (
                security_protocol, grid_ftp_end_points, data_movement_interface_id
            ) VALUES (?, ?, ?)
            ",
        )
        .bind(movement.security_protocol.as_str())
        .bind(encode_list(&movement.grid_ftp_end_points)?)
        .bind(&movement.data_movement_interface_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_grid_ftp_data_movement(
        &self,
        id: &str,
    ) -> Result<GridFtpDataMovement, RepositoryError> {
        let row = sqlx::query_as::<_, GridFtpDataMovementRow>(
            r"
            SELECT data_movement_interface_id, security_protocol, grid_ftp_end_points
            FROM gridftp_data_movements WHERE data_movement_interface_id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("gridftp data movement {id}")))?;

        Ok(GridFtpDataMovement {
            security_protocol: parse_tag(&row.security_protocol)?,
            grid_ftp_end_points: decode_list(&row.grid_ftp_end_points)?,
            data_movement_interface_id: row.data_movement_interface_id,
        })
    }

    async fn update_grid_ftp_data_movement(
        &self,
        movement: &GridFtpDataMovement,
    ) -> Result<(), RepositoryError> {
        let id = movement.data_movement_interface_id.as_str();
        let result = sqlx::query(
            r"
            UPDATE gridftp_data_movements SET security_protocol = ?, grid_ftp_end_points = ?
            WHERE data_movement_interface_id = ?
            ",
        )
        .bind(movement.security_protocol.as_str())
        .bind(encode_list(&movement.grid_ftp_end_points)?)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("gridftp data movement {id}"))
    }

    // ── UNICORE data movement ───────────────────────────────────────────────

    async fn insert_unicore_data_movement(
        &self,
        movement: &UnicoreDataMovement,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO unicore_data_movements (
                security_protocol, unicore_end_point_url, data_movement_interface_id
            ) VALUES (?, ?, ?)
            ",
        )
        .bind(movement.security_protocol.as_str())
        .bind(&movement.unicore_end_point_url)
        .bind(&movement.data_movement_interface_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_unicore_data_movement(
        &self,
        id: &str,
    ) -> Result<UnicoreDataMovement, RepositoryError> {
        let row = sqlx::query_as::<_, UnicoreRow>(
            r"
            SELECT data_movement_interface_id AS interface_id, security_protocol,
                   unicore_end_point_url
            FROM unicore_data_movements WHERE data_movement_interface_id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("unicore data movement {id}")))?;

        Ok(UnicoreDataMovement {
            security_protocol: parse_tag(&row.security_protocol)?,
            data_movement_interface_id: row.interface_id,
            unicore_end_point_url: row.unicore_end_point_url,
        })
    }

    async fn update_unicore_data_movement(
        &self,
        movement: &UnicoreDataMovement,
    ) -> Result<(), RepositoryError> {
        let id = movement.data_movement_interface_id.as_str();
        let result = sqlx::query(
            r"
            UPDATE unicore_data_movements SET security_protocol = ?, unicore_end_point_url = ?
            WHERE data_movement_interface_id = ?
            ",
        )
        .bind(movement.security_protocol.as_str())
        .bind(&movement.unicore_end_point_url)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("unicore data movement {id}"))
    }

    // ── Local data movement ─────────────────────────────────────────────────

    async fn insert_local_data_movement(
        &self,
        movement: &LocalDataMovement,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO local_data_movements (data_movement_interface_id) VALUES (?)")
            .bind(&movement.data_movement_interface_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_local_data_movement(&self, id: &str) -> Result<LocalDataMovement, RepositoryError> {
        sqlx::query_scalar::<_, String>(
            "SELECT data_movement_interface_id FROM local_data_movements WHERE data_movement_interface_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(|data_movement_interface_id| LocalDataMovement {
            data_movement_interface_id,
        })
        .ok_or_else(|| RepositoryError::NotFound(format!("local data movement {id}")))
    }

    /// Local movements carry nothing but their id, so an update only checks
    /// that the row exists.
    async fn update_local_data_movement(
        &self,
        movement: &LocalDataMovement,
    ) -> Result<(), RepositoryError> {
        self.get_local_data_movement(&movement.data_movement_interface_id)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use appcat_core::domain::{
        ApplicationParallelismType, JobManagerCommand, MonitorMode, ProviderName,
        ResourceJobManagerType, SecurityProtocol,
    };

    async fn repo() -> SqliteInterfaceConfigRepository {
        SqliteInterfaceConfigRepository::new(setup_test_database().await.unwrap())
    }

    fn slurm(id: &str) -> ResourceJobManager {
        let mut manager = ResourceJobManager {
            resource_job_manager_id: id.to_string(),
            resource_job_manager_type: ResourceJobManagerType::Slurm,
            job_manager_bin_path: Some("/usr/bin".to_string()),
            ..ResourceJobManager::default()
        };
        manager
            .job_manager_commands
            .insert(JobManagerCommand::Submission, "sbatch".to_string());
        manager
            .parallelism_prefix
            .insert(ApplicationParallelismType::Mpi, "srun".to_string());
        manager
    }

    #[tokio::test]
    async fn test_ssh_submission_writes_its_manager() {
        let repo = repo().await;
        let submission = SshJobSubmission {
            job_submission_interface_id: "ssh-1".to_string(),
            security_protocol: SecurityProtocol::SshKeys,
            resource_job_manager: slurm("rjm-1"),
            ssh_port: Some(22),
            monitor_mode: Some(MonitorMode::PollJobManager),
            ..SshJobSubmission::default()
        };

        repo.insert_ssh_job_submission(&submission).await.unwrap();

        assert_eq!(repo.get_ssh_job_submission("ssh-1").await.unwrap(), submission);
        assert_eq!(repo.get_resource_job_manager("rjm-1").await.unwrap(), slurm("rjm-1"));
    }

    #[tokio::test]
    async fn test_manager_update_replaces_command_map() {
        let repo = repo().await;
        repo.insert_resource_job_manager(&slurm("rjm-1")).await.unwrap();

        let mut updated = slurm("rjm-1");
        updated.job_manager_commands.clear();
        updated
            .job_manager_commands
            .insert(JobManagerCommand::Deletion, "scancel".to_string());
        repo.update_resource_job_manager(&updated).await.unwrap();

        assert_eq!(repo.get_resource_job_manager("rjm-1").await.unwrap(), updated);
        let missing = repo
            .update_resource_job_manager(&slurm("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(missing, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cloud_and_data_movements() {
        let repo = repo().await;
        let cloud = CloudJobSubmission {
            job_submission_interface_id: "cloud-1".to_string(),
            node_id: "node".to_string(),
            executable_type: "docker".to_string(),
            provider_name: ProviderName::AwsEc2,
            user_account_name: "ubuntu".to_string(),
            ..CloudJobSubmission::default()
        };
        let gridftp = GridFtpDataMovement {
            data_movement_interface_id: "gftp-1".to_string(),
            security_protocol: SecurityProtocol::Gsi,
            grid_ftp_end_points: vec!["gsiftp://a".to_string(), "gsiftp://b".to_string()],
        };
        let local = LocalDataMovement {
            data_movement_interface_id: "ldm-1".to_string(),
        };

        repo.insert_cloud_job_submission(&cloud).await.unwrap();
        repo.insert_grid_ftp_data_movement(&gridftp).await.unwrap();
        repo.insert_local_data_movement(&local).await.unwrap();

        assert_eq!(repo.get_cloud_job_submission("cloud-1").await.unwrap(), cloud);
        assert_eq!(repo.get_grid_ftp_data_movement("gftp-1").await.unwrap(), gridftp);
        assert_eq!(repo.get_local_data_movement("ldm-1").await.unwrap(), local);
        assert!(repo.update_local_data_movement(&local).await.is_ok());
        assert!(matches!(
            repo.get_scp_data_movement("nope").await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_unicore_configs_round_trip() {
        let repo = repo().await;
        let mut submission = UnicoreJobSubmission {
            job_submission_interface_id: "unicore-js-1".to_string(),
            security_protocol: SecurityProtocol::Gsi,
            unicore_end_point_url: "https://unicore.example.org:8080/SITE".to_string(),
        };
        let movement = UnicoreDataMovement {
            data_movement_interface_id: "unicore-dm-1".to_string(),
            security_protocol: SecurityProtocol::Gsi,
            unicore_end_point_url: "https://unicore.example.org:8080/STORAGE".to_string(),
        };

        repo.insert_unicore_job_submission(&submission).await.unwrap();
        repo.insert_unicore_data_movement(&movement).await.unwrap();

        assert_eq!(
            repo.get_unicore_job_submission("unicore-js-1").await.unwrap(),
            submission
        );
        assert_eq!(repo.get_unicore_data_movement("unicore-dm-1").await.unwrap(), movement);

        submission.unicore_end_point_url = "https://moved.example.org/SITE".to_string();
        repo.update_unicore_job_submission(&submission).await.unwrap();
        assert_eq!(
            repo.get_unicore_job_submission("unicore-js-1").await.unwrap(),
            submission
        );
        assert!(matches!(
            repo.get_unicore_data_movement("nope").await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    async fn manager_count(repo: &SqliteInterfaceConfigRepository) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM resource_job_managers")
            .fetch_one(&repo.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_switching_manager_drops_the_unreferenced_one() {
        let repo = repo().await;
        let mut submission = SshJobSubmission {
            job_submission_interface_id: "ssh-1".to_string(),
            resource_job_manager: slurm("rjm-1"),
            ..SshJobSubmission::default()
        };
        repo.insert_ssh_job_submission(&submission).await.unwrap();

        submission.resource_job_manager = slurm("rjm-2");
        repo.update_ssh_job_submission(&submission).await.unwrap();

        assert_eq!(manager_count(&repo).await, 1);
        assert!(matches!(
            repo.get_resource_job_manager("rjm-1").await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
        assert_eq!(repo.get_ssh_job_submission("ssh-1").await.unwrap(), submission);
    }

    #[tokio::test]
    async fn test_shared_manager_survives_relink() {
        let repo = repo().await;
        let ssh = SshJobSubmission {
            job_submission_interface_id: "ssh-1".to_string(),
            resource_job_manager: slurm("shared"),
            ..SshJobSubmission::default()
        };
        let mut local = LocalSubmission {
            job_submission_interface_id: "local-1".to_string(),
            resource_job_manager: slurm("shared"),
            ..LocalSubmission::default()
        };
        repo.insert_ssh_job_submission(&ssh).await.unwrap();
        repo.insert_local_submission(&local).await.unwrap();

        local.resource_job_manager = slurm("own");
        repo.update_local_submission(&local).await.unwrap();

        assert_eq!(manager_count(&repo).await, 2);
        assert!(repo.get_resource_job_manager("shared").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_of_missing_submission_writes_nothing() {
        let repo = repo().await;
        let ghost = SshJobSubmission {
            job_submission_interface_id: "ghost".to_string(),
            resource_job_manager: slurm("rjm-ghost"),
            ..SshJobSubmission::default()
        };

        let err = repo.update_ssh_job_submission(&ghost).await.unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert_eq!(manager_count(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_scp_update_clears_optional_fields() {
        let repo = repo().await;
        let mut scp = ScpDataMovement {
            data_movement_interface_id: "scp-1".to_string(),
            security_protocol: SecurityProtocol::SshKeys,
            alternative_scp_host_name: Some("alt.example.org".to_string()),
            ssh_port: Some(2222),
        };
        repo.insert_scp_data_movement(&scp).await.unwrap();

        scp.alternative_scp_host_name = None;
        repo.update_scp_data_movement(&scp).await.unwrap();

        assert_eq!(repo.get_scp_data_movement("scp-1").await.unwrap(), scp);
    }
}
