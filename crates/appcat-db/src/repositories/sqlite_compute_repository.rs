//! `SQLite` implementation of the compute resource repository.
//!
//! A resource row owns its batch queues, file-system roots and interface
//! tuples through `ON DELETE CASCADE` child tables. Queues are diffed on
//! update so surviving rows keep their identity; file systems and interface
//! tuples are value lists and are rewritten.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use appcat_core::domain::{
    BatchQueue, ComputeResourceDescription, DataMovementInterface, JobSubmissionInterface,
    ResourceChildKey,
};
use appcat_core::ports::ComputeResourceRepository;
use appcat_core::sync;
use appcat_core::{FieldFilter, RepositoryError};

use super::row_mappers::{
    decode_list, encode_list, ensure_affected, map_sqlx_error, parse_tag, position, push_filters,
    row_exists, stored_keys,
};

/// `SQLite` implementation of the compute resource repository.
pub struct SqliteComputeResourceRepository {
    pool: SqlitePool,
}

impl SqliteComputeResourceRepository {
    /// Create a new `SQLite` compute resource repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal row types for database queries
// ─────────────────────────────────────────────────────────────────────────────

const RESOURCE_COLUMNS: &str = "compute_resource_id, host_name, host_aliases, ip_addresses, \
    resource_description, enabled, max_memory_per_node, gateway_usage_reporting, \
    gateway_usage_module_load_command, gateway_usage_executable, cpus_per_node, \
    default_node_count, default_cpu_count, default_walltime";

#[derive(sqlx::FromRow)]
struct ComputeResourceRow {
    compute_resource_id: String,
    host_name: String,
    host_aliases: String,
    ip_addresses: String,
    resource_description: Option<String>,
    enabled: bool,
    max_memory_per_node: Option<i32>,
    gateway_usage_reporting: bool,
    gateway_usage_module_load_command: Option<String>,
    gateway_usage_executable: Option<String>,
    cpus_per_node: Option<i32>,
    default_node_count: Option<i32>,
    default_cpu_count: Option<i32>,
    default_walltime: Option<i32>,
}

#[derive(sqlx::FromRow)]
struct BatchQueueRow {
    queue_name: String,
    queue_description: Option<String>,
    max_run_time: Option<i32>,
    max_nodes: Option<i32>,
    max_processors: Option<i32>,
    max_jobs_in_queue: Option<i32>,
    max_memory: Option<i32>,
    cpu_per_node: Option<i32>,
    default_node_count: Option<i32>,
    default_cpu_count: Option<i32>,
    default_walltime: Option<i32>,
    queue_specific_macros: Option<String>,
    is_default_queue: bool,
}

impl From<BatchQueueRow> for BatchQueue {
    fn from(row: BatchQueueRow) -> Self {
        Self {
            queue_name: row.queue_name,
            queue_description: row.queue_description,
            max_run_time: row.max_run_time,
            max_nodes: row.max_nodes,
            max_processors: row.max_processors,
            max_jobs_in_queue: row.max_jobs_in_queue,
            max_memory: row.max_memory,
            cpu_per_node: row.cpu_per_node,
            default_node_count: row.default_node_count,
            default_cpu_count: row.default_cpu_count,
            default_walltime: row.default_walltime,
            queue_specific_macros: row.queue_specific_macros,
            is_default_queue: row.is_default_queue,
        }
    }
}

#[derive(sqlx::FromRow)]
struct JobSubmissionInterfaceRow {
    job_submission_interface_id: String,
    job_submission_protocol: String,
    priority_order: i32,
}

/// Shared with the storage resource repository.
#[derive(sqlx::FromRow)]
pub(super) struct DataMovementInterfaceRow {
    data_movement_interface_id: String,
    data_movement_protocol: String,
    priority_order: i32,
}

impl DataMovementInterfaceRow {
    pub(super) fn into_domain(self) -> Result<DataMovementInterface, RepositoryError> {
        Ok(DataMovementInterface {
            data_movement_interface_id: self.data_movement_interface_id,
            data_movement_protocol: parse_tag(&self.data_movement_protocol)?,
            priority_order: self.priority_order,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

async fn hydrate(
    conn: &mut SqliteConnection,
    row: ComputeResourceRow,
) -> Result<ComputeResourceDescription, RepositoryError> {
    let id = row.compute_resource_id.as_str();

    let batch_queues = sqlx::query_as::<_, BatchQueueRow>(
        r"
        SELECT queue_name, queue_description, max_run_time, max_nodes, max_processors,
               max_jobs_in_queue, max_memory, cpu_per_node, default_node_count,
               default_cpu_count, default_walltime, queue_specific_macros, is_default_queue
        FROM batch_queues WHERE compute_resource_id = ? ORDER BY position
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(BatchQueue::from)
    .collect();

    let file_system_rows = sqlx::query_as::<_, (String, String)>(
        "SELECT file_system, path FROM compute_file_systems WHERE compute_resource_id = ?",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;
    let file_systems = file_system_rows
        .into_iter()
        .map(|(fs, path)| Ok((parse_tag(&fs)?, path)))
        .collect::<Result<_, RepositoryError>>()?;

    let job_submission_interfaces = sqlx::query_as::<_, JobSubmissionInterfaceRow>(
        r"
        SELECT job_submission_interface_id, job_submission_protocol, priority_order
        FROM job_submission_interfaces WHERE compute_resource_id = ? ORDER BY position
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(|r| {
        Ok(JobSubmissionInterface {
            job_submission_interface_id: r.job_submission_interface_id,
            job_submission_protocol: parse_tag(&r.job_submission_protocol)?,
            priority_order: r.priority_order,
        })
    })
    .collect::<Result<_, RepositoryError>>()?;

    let data_movement_interfaces = sqlx::query_as::<_, DataMovementInterfaceRow>(
        r"
        SELECT data_movement_interface_id, data_movement_protocol, priority_order
        FROM compute_data_movement_interfaces WHERE compute_resource_id = ? ORDER BY position
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(DataMovementInterfaceRow::into_domain)
    .collect::<Result<_, RepositoryError>>()?;

    Ok(ComputeResourceDescription {
        host_aliases: decode_list(&row.host_aliases)?,
        ip_addresses: decode_list(&row.ip_addresses)?,
        compute_resource_id: row.compute_resource_id,
        host_name: row.host_name,
        resource_description: row.resource_description,
        enabled: row.enabled,
        batch_queues,
        file_systems,
        job_submission_interfaces,
        data_movement_interfaces,
        max_memory_per_node: row.max_memory_per_node,
        gateway_usage_reporting: row.gateway_usage_reporting,
        gateway_usage_module_load_command: row.gateway_usage_module_load_command,
        gateway_usage_executable: row.gateway_usage_executable,
        cpus_per_node: row.cpus_per_node,
        default_node_count: row.default_node_count,
        default_cpu_count: row.default_cpu_count,
        default_walltime: row.default_walltime,
    })
}

async fn hydrate_all(
    conn: &mut SqliteConnection,
    rows: Vec<ComputeResourceRow>,
) -> Result<Vec<ComputeResourceDescription>, RepositoryError> {
    let mut resources = Vec::with_capacity(rows.len());
    for row in rows {
        resources.push(hydrate(conn, row).await?);
    }
    Ok(resources)
}

async fn resource_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool, RepositoryError> {
    row_exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM compute_resources WHERE compute_resource_id = ?)",
        &[id],
    )
    .await
}

async fn require_resource(conn: &mut SqliteConnection, id: &str) -> Result<(), RepositoryError> {
    if resource_exists(conn, id).await? {
        Ok(())
    } else {
        Err(RepositoryError::NotFound(format!("compute resource {id}")))
    }
}

/// Insert or rewrite one queue. `existing` selects UPDATE over INSERT.
async fn write_batch_queue(
    conn: &mut SqliteConnection,
    resource_id: &str,
    index: usize,
    queue: &BatchQueue,
    existing: bool,
) -> Result<(), RepositoryError> {
    let sql = if existing {
        r"
        UPDATE batch_queues
        SET position = ?, queue_description = ?, max_run_time = ?, max_nodes = ?,
            max_processors = ?, max_jobs_in_queue = ?, max_memory = ?, cpu_per_node = ?,
            default_node_count = ?, default_cpu_count = ?, default_walltime = ?,
            queue_specific_macros = ?, is_default_queue = ?
        WHERE compute_resource_id = ? AND queue_name = ?
        "
    } else {
        r"
        INSERT INTO batch_queues (
            position, queue_description, max_run_time, max_nodes, max_processors,
            max_jobs_in_queue, max_memory, cpu_per_node, default_node_count,
            default_cpu_count, default_walltime, queue_specific_macros, is_default_queue,
            compute_resource_id, queue_name
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "
    };

    sqlx::query(sql)
        .bind(position(index))
        .bind(&queue.queue_description)
        .bind(queue.max_run_time)
        .bind(queue.max_nodes)
        .bind(queue.max_processors)
        .bind(queue.max_jobs_in_queue)
        .bind(queue.max_memory)
        .bind(queue.cpu_per_node)
        .bind(queue.default_node_count)
        .bind(queue.default_cpu_count)
        .bind(queue.default_walltime)
        .bind(&queue.queue_specific_macros)
        .bind(queue.is_default_queue)
        .bind(resource_id)
        .bind(&queue.queue_name)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

async fn sync_batch_queues(
    conn: &mut SqliteConnection,
    resource_id: &str,
    queues: &[BatchQueue],
) -> Result<(), RepositoryError> {
    let stored = stored_keys(
        conn,
        "SELECT queue_name FROM batch_queues WHERE compute_resource_id = ? ORDER BY position",
        &[resource_id],
    )
    .await?;
    let plan = sync::plan(&stored, queues, |q| q.queue_name.as_str())?;

    for queue_name in &plan.delete {
        sqlx::query("DELETE FROM batch_queues WHERE compute_resource_id = ? AND queue_name = ?")
            .bind(resource_id)
            .bind(queue_name)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }
    for (index, queue) in plan.update {
        write_batch_queue(conn, resource_id, index, queue, true).await?;
    }
    for (index, queue) in plan.insert {
        write_batch_queue(conn, resource_id, index, queue, false).await?;
    }
    Ok(())
}

async fn replace_file_systems(
    conn: &mut SqliteConnection,
    resource: &ComputeResourceDescription,
) -> Result<(), RepositoryError> {
    let id = resource.compute_resource_id.as_str();
    sqlx::query("DELETE FROM compute_file_systems WHERE compute_resource_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    for (fs, path) in &resource.file_systems {
        sqlx::query(
            "INSERT INTO compute_file_systems (compute_resource_id, file_system, path) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(fs.as_str())
        .bind(path)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    Ok(())
}

async fn insert_job_submission_interface(
    conn: &mut SqliteConnection,
    resource_id: &str,
    index: Option<usize>,
    interface: &JobSubmissionInterface,
) -> Result<(), RepositoryError> {
    // Appends go after the current last row.
    sqlx::query(
        r"
        INSERT INTO job_submission_interfaces (
            compute_resource_id, job_submission_interface_id, job_submission_protocol,
            priority_order, position
        ) VALUES (?, ?, ?, ?, COALESCE(?, (
            SELECT COALESCE(MAX(position) + 1, 0) FROM job_submission_interfaces
            WHERE compute_resource_id = ?
        )))
        ",
    )
    .bind(resource_id)
    .bind(&interface.job_submission_interface_id)
    .bind(interface.job_submission_protocol.as_str())
    .bind(interface.priority_order)
    .bind(index.map(position))
    .bind(resource_id)
    .execute(conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}

async fn insert_data_movement_interface(
    conn: &mut SqliteConnection,
    resource_id: &str,
    index: Option<usize>,
    interface: &DataMovementInterface,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO compute_data_movement_interfaces (
            compute_resource_id, data_movement_interface_id, data_movement_protocol,
            priority_order, position
        ) VALUES (?, ?, ?, ?, COALESCE(?, (
            SELECT COALESCE(MAX(position) + 1, 0) FROM compute_data_movement_interfaces
            WHERE compute_resource_id = ?
        )))
        ",
    )
    .bind(resource_id)
    .bind(&interface.data_movement_interface_id)
    .bind(interface.data_movement_protocol.as_str())
    .bind(interface.priority_order)
    .bind(index.map(position))
    .bind(resource_id)
    .execute(conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}

async fn replace_interfaces(
    conn: &mut SqliteConnection,
    resource: &ComputeResourceDescription,
) -> Result<(), RepositoryError> {
    let id = resource.compute_resource_id.as_str();
    sqlx::query("DELETE FROM job_submission_interfaces WHERE compute_resource_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    sqlx::query("DELETE FROM compute_data_movement_interfaces WHERE compute_resource_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    for (index, interface) in resource.job_submission_interfaces.iter().enumerate() {
        insert_job_submission_interface(conn, id, Some(index), interface).await?;
    }
    for (index, interface) in resource.data_movement_interfaces.iter().enumerate() {
        insert_data_movement_interface(conn, id, Some(index), interface).await?;
    }
    Ok(())
}

/// Bind the scalar columns shared by INSERT and UPDATE, in `RESOURCE_COLUMNS`
/// order minus the id.
async fn write_resource_row(
    conn: &mut SqliteConnection,
    sql: &str,
    resource: &ComputeResourceDescription,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query(sql)
        .bind(&resource.host_name)
        .bind(encode_list(&resource.host_aliases)?)
        .bind(encode_list(&resource.ip_addresses)?)
        .bind(&resource.resource_description)
        .bind(resource.enabled)
        .bind(resource.max_memory_per_node)
        .bind(resource.gateway_usage_reporting)
        .bind(&resource.gateway_usage_module_load_command)
        .bind(&resource.gateway_usage_executable)
        .bind(resource.cpus_per_node)
        .bind(resource.default_node_count)
        .bind(resource.default_cpu_count)
        .bind(resource.default_walltime)
        .bind(&resource.compute_resource_id)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(result.rows_affected())
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ComputeResourceRepository for SqliteComputeResourceRepository {
    async fn insert(&self, resource: &ComputeResourceDescription) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        write_resource_row(
            &mut tx,
            r"
            INSERT INTO compute_resources (
                host_name, host_aliases, ip_addresses, resource_description, enabled,
                max_memory_per_node, gateway_usage_reporting, gateway_usage_module_load_command,
                gateway_usage_executable, cpus_per_node, default_node_count, default_cpu_count,
                default_walltime, compute_resource_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            resource,
        )
        .await?;
        sync_batch_queues(&mut tx, &resource.compute_resource_id, &resource.batch_queues).await?;
        replace_file_systems(&mut tx, resource).await?;
        replace_interfaces(&mut tx, resource).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<ComputeResourceDescription, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, ComputeResourceRow>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM compute_resources WHERE compute_resource_id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("compute resource {id}")))?;

        hydrate(&mut conn, row).await
    }

    async fn update(&self, resource: &ComputeResourceDescription) -> Result<(), RepositoryError> {
        let id = resource.compute_resource_id.as_str();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let rows = write_resource_row(
            &mut tx,
            r"
            UPDATE compute_resources
            SET host_name = ?, host_aliases = ?, ip_addresses = ?, resource_description = ?,
                enabled = ?, max_memory_per_node = ?, gateway_usage_reporting = ?,
                gateway_usage_module_load_command = ?, gateway_usage_executable = ?,
                cpus_per_node = ?, default_node_count = ?, default_cpu_count = ?,
                default_walltime = ?
            WHERE compute_resource_id = ?
            ",
            resource,
        )
        .await?;
        ensure_affected(rows, || format!("compute resource {id}"))?;

        sync_batch_queues(&mut tx, id, &resource.batch_queues).await?;
        replace_file_systems(&mut tx, resource).await?;
        replace_interfaces(&mut tx, resource).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(compute_resource_id = id, "Rewrote compute resource rows");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        // Queues, file systems and interface tuples go via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM compute_resources WHERE compute_resource_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("compute resource {id}"))
    }

    async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        resource_exists(&mut conn, id).await
    }

    async fn list(&self) -> Result<Vec<ComputeResourceDescription>, RepositoryError> {
        self.filter(&[]).await
    }

    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<ComputeResourceDescription>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;

        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {RESOURCE_COLUMNS} FROM compute_resources"));
        push_filters(&mut query, filters);
        query.push(" ORDER BY rowid");

        let rows = query
            .build_query_as::<ComputeResourceRow>()
            .fetch_all(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        hydrate_all(&mut conn, rows).await
    }

    async fn list_names(&self, enabled_only: bool) -> Result<Vec<(String, String)>, RepositoryError> {
        sqlx::query_as::<_, (String, String)>(
            r"
            SELECT compute_resource_id, host_name FROM compute_resources
            WHERE (? = 0 OR enabled = 1)
            ORDER BY rowid
            ",
        )
        .bind(enabled_only)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_batch_queue(&self, key: &ResourceChildKey) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        require_resource(&mut tx, &key.resource_id).await?;

        sqlx::query("DELETE FROM batch_queues WHERE compute_resource_id = ? AND queue_name = ?")
            .bind(&key.resource_id)
            .bind(&key.child_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn add_job_submission_interface(
        &self,
        resource_id: &str,
        interface: &JobSubmissionInterface,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        require_resource(&mut tx, resource_id).await?;
        insert_job_submission_interface(&mut tx, resource_id, None, interface).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_job_submission_interface(
        &self,
        key: &ResourceChildKey,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM job_submission_interfaces
            WHERE compute_resource_id = ? AND job_submission_interface_id = ?
            ",
        )
        .bind(&key.resource_id)
        .bind(&key.child_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("job submission interface {key}"))
    }

    async fn add_data_movement_interface(
        &self,
        resource_id: &str,
        interface: &DataMovementInterface,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        require_resource(&mut tx, resource_id).await?;
        insert_data_movement_interface(&mut tx, resource_id, None, interface).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_data_movement_interface(
        &self,
        key: &ResourceChildKey,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM compute_data_movement_interfaces
            WHERE compute_resource_id = ? AND data_movement_interface_id = ?
            ",
        )
        .bind(&key.resource_id)
        .bind(&key.child_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("data movement interface {key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use appcat_core::domain::{DataMovementProtocol, FileSystems, JobSubmissionProtocol};
    use appcat_core::filter::FilterField;

    fn resource(id: &str, host: &str) -> ComputeResourceDescription {
        let mut resource = ComputeResourceDescription {
            compute_resource_id: id.to_string(),
            host_name: host.to_string(),
            host_aliases: vec![format!("alias.{host}")],
            ip_addresses: vec!["10.0.0.1".to_string()],
            enabled: true,
            batch_queues: vec![BatchQueue::named("normal"), BatchQueue::named("debug")],
            job_submission_interfaces: vec![JobSubmissionInterface {
                job_submission_interface_id: "ssh-1".to_string(),
                job_submission_protocol: JobSubmissionProtocol::Ssh,
                priority_order: 1,
            }],
            data_movement_interfaces: vec![DataMovementInterface {
                data_movement_interface_id: "scp-1".to_string(),
                data_movement_protocol: DataMovementProtocol::Scp,
                priority_order: 1,
            }],
            ..ComputeResourceDescription::default()
        };
        resource
            .file_systems
            .insert(FileSystems::Home, "/home".to_string());
        resource
    }

    async fn repo() -> SqliteComputeResourceRepository {
        SqliteComputeResourceRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = repo().await;
        let original = resource("c1", "c1.example.org");

        repo.insert(&original).await.unwrap();

        assert_eq!(repo.get("c1").await.unwrap(), original);
        assert!(repo.exists("c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_already_exists() {
        let repo = repo().await;
        repo.insert(&resource("c1", "a")).await.unwrap();

        let err = repo.insert(&resource("c1", "b")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_update_drops_missing_queues_and_keeps_order() {
        let repo = repo().await;
        let mut stored = resource("c1", "c1.example.org");
        stored.batch_queues = ["q1", "q2", "q3", "q4"].map(BatchQueue::named).to_vec();
        repo.insert(&stored).await.unwrap();

        stored.batch_queues = vec![
            BatchQueue {
                max_nodes: Some(8),
                ..BatchQueue::named("q4")
            },
            BatchQueue::named("q1"),
            BatchQueue::named("q5"),
        ];
        stored.job_submission_interfaces.clear();
        repo.update(&stored).await.unwrap();

        let reloaded = repo.get("c1").await.unwrap();
        let names: Vec<_> = reloaded.batch_queues.iter().map(|q| q.queue_name.as_str()).collect();
        assert_eq!(names, ["q4", "q1", "q5"]);
        assert_eq!(reloaded.batch_queue("q4").unwrap().max_nodes, Some(8));
        assert!(reloaded.job_submission_interfaces.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_queue_name_rolls_back_update() {
        let repo = repo().await;
        let mut stored = resource("c1", "c1.example.org");
        repo.insert(&stored).await.unwrap();

        stored.host_name = "renamed".to_string();
        stored.batch_queues = vec![BatchQueue::named("q"), BatchQueue::named("q")];
        let err = repo.update(&stored).await.unwrap_err();

        assert!(matches!(err, RepositoryError::InvalidKey(_)));
        assert_eq!(repo.get("c1").await.unwrap().host_name, "c1.example.org");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let repo = repo().await;

        let update = repo.update(&resource("ghost", "h")).await.unwrap_err();
        let delete = repo.delete("ghost").await.unwrap_err();

        assert!(matches!(update, RepositoryError::NotFound(_)));
        assert!(matches!(delete, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_owned_rows() {
        let repo = repo().await;
        repo.insert(&resource("c1", "h")).await.unwrap();

        repo.delete("c1").await.unwrap();

        let queues: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM batch_queues")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(queues, 0);
        assert!(!repo.exists("c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_filter_and_names() {
        let repo = repo().await;
        repo.insert(&resource("c1", "alpha")).await.unwrap();
        let mut disabled = resource("c2", "beta");
        disabled.enabled = false;
        repo.insert(&disabled).await.unwrap();

        let filters = [FieldFilter {
            field: FilterField::HostName,
            value: "beta".to_string(),
        }];
        let matched = repo.filter(&filters).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].compute_resource_id, "c2");

        assert_eq!(repo.list_names(false).await.unwrap().len(), 2);
        assert_eq!(
            repo.list_names(true).await.unwrap(),
            vec![("c1".to_string(), "alpha".to_string())]
        );
    }

    #[tokio::test]
    async fn test_interface_append_and_delete() {
        let repo = repo().await;
        repo.insert(&resource("c1", "h")).await.unwrap();

        let local = JobSubmissionInterface {
            job_submission_interface_id: "local-1".to_string(),
            job_submission_protocol: JobSubmissionProtocol::Local,
            priority_order: 2,
        };
        repo.add_job_submission_interface("c1", &local).await.unwrap();
        let dup = repo.add_job_submission_interface("c1", &local).await.unwrap_err();
        assert!(matches!(dup, RepositoryError::AlreadyExists(_)));

        let ids: Vec<_> = repo
            .get("c1")
            .await
            .unwrap()
            .job_submission_interfaces
            .into_iter()
            .map(|i| i.job_submission_interface_id)
            .collect();
        assert_eq!(ids, ["ssh-1", "local-1"]);

        repo.delete_job_submission_interface(&ResourceChildKey::new("c1", "ssh-1"))
            .await
            .unwrap();
        assert_eq!(repo.get("c1").await.unwrap().job_submission_interfaces, vec![local]);

        let missing = repo
            .add_data_movement_interface("ghost", &DataMovementInterface::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_batch_queue() {
        let repo = repo().await;
        repo.insert(&resource("c1", "h")).await.unwrap();

        repo.delete_batch_queue(&ResourceChildKey::new("c1", "debug"))
            .await
            .unwrap();
        repo.delete_batch_queue(&ResourceChildKey::new("c1", "absent"))
            .await
            .unwrap();

        let queues = repo.get("c1").await.unwrap().batch_queues;
        assert_eq!(queues, vec![BatchQueue::named("normal")]);
        assert!(
            repo.delete_batch_queue(&ResourceChildKey::new("ghost", "normal"))
                .await
                .is_err()
        );
    }
}
