//! `SQLite` implementation of the application deployment repository.
//!
//! Command lists and environment lists live in two child tables, tagged by
//! `kind`. Both are rewritten wholesale on every insert and update.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use appcat_core::domain::{
    ApplicationDeploymentDescription, ApplicationParallelismType, CommandObject, SetEnvPaths,
};
use appcat_core::ports::ApplicationDeploymentRepository;
use appcat_core::{FieldFilter, RepositoryError};

use super::row_mappers::{
    ensure_affected, map_sqlx_error, parse_tag, position, push_filters, push_in_list, row_exists,
};

const DEPLOYMENT_COLUMNS: &str = "app_deployment_id, app_module_id, compute_host_id, \
     executable_path, parallelism, app_deployment_description, default_queue_name, \
     default_node_count, default_cpu_count, default_walltime, editable_by_user";

const MODULE_LOAD: &str = "module_load";
const PRE_JOB: &str = "pre_job";
const POST_JOB: &str = "post_job";
const LIB_PREPEND: &str = "lib_prepend";
const LIB_APPEND: &str = "lib_append";
const SET_ENV: &str = "set_env";

/// `SQLite` implementation of the application deployment repository.
pub struct SqliteDeploymentRepository {
    pool: SqlitePool,
}

impl SqliteDeploymentRepository {
    /// Create a new `SQLite` deployment repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(
        &self,
        mut query: QueryBuilder<'_, Sqlite>,
    ) -> Result<Vec<ApplicationDeploymentDescription>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        query.push(" ORDER BY rowid");
        let rows = query
            .build_query_as::<DeploymentRow>()
            .fetch_all(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;

        let mut deployments = Vec::with_capacity(rows.len());
        for row in rows {
            deployments.push(hydrate(&mut conn, row).await?);
        }
        Ok(deployments)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct DeploymentRow {
    app_deployment_id: String,
    app_module_id: String,
    compute_host_id: String,
    executable_path: String,
    parallelism: String,
    app_deployment_description: Option<String>,
    default_queue_name: Option<String>,
    default_node_count: Option<i32>,
    default_cpu_count: Option<i32>,
    default_walltime: Option<i32>,
    editable_by_user: bool,
}

#[derive(sqlx::FromRow)]
struct CommandRow {
    kind: String,
    command: String,
    command_order: i32,
}

#[derive(sqlx::FromRow)]
struct EnvironmentRow {
    kind: String,
    name: String,
    value: String,
    env_path_order: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn hydrate(
    conn: &mut SqliteConnection,
    row: DeploymentRow,
) -> Result<ApplicationDeploymentDescription, RepositoryError> {
    let id = row.app_deployment_id.as_str();
    let parallelism: ApplicationParallelismType = parse_tag(&row.parallelism)?;

    let commands = sqlx::query_as::<_, CommandRow>(
        r"
        SELECT kind, command, command_order FROM deployment_commands
        WHERE app_deployment_id = ? ORDER BY kind, position
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let environment = sqlx::query_as::<_, EnvironmentRow>(
        r"
        SELECT kind, name, value, env_path_order FROM deployment_environment
        WHERE app_deployment_id = ? ORDER BY kind, position
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let mut deployment = ApplicationDeploymentDescription {
        app_deployment_id: row.app_deployment_id,
        app_module_id: row.app_module_id,
        compute_host_id: row.compute_host_id,
        executable_path: row.executable_path,
        parallelism,
        app_deployment_description: row.app_deployment_description,
        default_queue_name: row.default_queue_name,
        default_node_count: row.default_node_count,
        default_cpu_count: row.default_cpu_count,
        default_walltime: row.default_walltime,
        editable_by_user: row.editable_by_user,
        ..ApplicationDeploymentDescription::default()
    };

    for row in commands {
        let target = match row.kind.as_str() {
            MODULE_LOAD => &mut deployment.module_load_cmds,
            PRE_JOB => &mut deployment.pre_job_commands,
            POST_JOB => &mut deployment.post_job_commands,
            other => {
                return Err(RepositoryError::Serialization(format!(
                    "unknown command kind '{other}'"
                )));
            }
        };
        target.push(CommandObject {
            command: row.command,
            command_order: row.command_order,
        });
    }

    for row in environment {
        let target = match row.kind.as_str() {
            LIB_PREPEND => &mut deployment.lib_prepend_paths,
            LIB_APPEND => &mut deployment.lib_append_paths,
            SET_ENV => &mut deployment.set_environment,
            other => {
                return Err(RepositoryError::Serialization(format!(
                    "unknown environment kind '{other}'"
                )));
            }
        };
        target.push(SetEnvPaths {
            name: row.name,
            value: row.value,
            env_path_order: row.env_path_order,
        });
    }

    Ok(deployment)
}

async fn replace_children(
    conn: &mut SqliteConnection,
    deployment: &ApplicationDeploymentDescription,
) -> Result<(), RepositoryError> {
    let id = deployment.app_deployment_id.as_str();
    for table in ["deployment_commands", "deployment_environment"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE app_deployment_id = ?"))
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }

    let commands = [
        (MODULE_LOAD, &deployment.module_load_cmds),
        (PRE_JOB, &deployment.pre_job_commands),
        (POST_JOB, &deployment.post_job_commands),
    ];
    for (kind, list) in commands {
        for (index, cmd) in list.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO deployment_commands (
                    app_deployment_id, kind, position, command, command_order
                ) VALUES (?, ?, ?, ?, ?)
                ",
            )
            .bind(id)
            .bind(kind)
            .bind(position(index))
            .bind(&cmd.command)
            .bind(cmd.command_order)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        }
    }

    let environment = [
        (LIB_PREPEND, &deployment.lib_prepend_paths),
        (LIB_APPEND, &deployment.lib_append_paths),
        (SET_ENV, &deployment.set_environment),
    ];
    for (kind, list) in environment {
        for (index, env) in list.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO deployment_environment (
                    app_deployment_id, kind, position, name, value, env_path_order
                ) VALUES (?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(id)
            .bind(kind)
            .bind(position(index))
            .bind(&env.name)
            .bind(&env.value)
            .bind(env.env_path_order)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ApplicationDeploymentRepository for SqliteDeploymentRepository {
    async fn insert(
        &self,
        deployment: &ApplicationDeploymentDescription,
        gateway_id: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r"
            INSERT INTO app_deployments (
                app_module_id, compute_host_id, executable_path, parallelism,
                app_deployment_description, default_queue_name, default_node_count,
                default_cpu_count, default_walltime, editable_by_user, gateway_id,
                app_deployment_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&deployment.app_module_id)
        .bind(&deployment.compute_host_id)
        .bind(&deployment.executable_path)
        .bind(deployment.parallelism.as_str())
        .bind(&deployment.app_deployment_description)
        .bind(&deployment.default_queue_name)
        .bind(deployment.default_node_count)
        .bind(deployment.default_cpu_count)
        .bind(deployment.default_walltime)
        .bind(deployment.editable_by_user)
        .bind(gateway_id)
        .bind(&deployment.app_deployment_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        replace_children(&mut tx, deployment).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get(&self, id: &str) -> Result<ApplicationDeploymentDescription, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, DeploymentRow>(&format!(
            "SELECT {DEPLOYMENT_COLUMNS} FROM app_deployments WHERE app_deployment_id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("application deployment {id}")))?;

        hydrate(&mut conn, row).await
    }

    async fn update(
        &self,
        deployment: &ApplicationDeploymentDescription,
    ) -> Result<(), RepositoryError> {
        let id = deployment.app_deployment_id.as_str();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r"
            UPDATE app_deployments
            SET app_module_id = ?, compute_host_id = ?, executable_path = ?, parallelism = ?,
                app_deployment_description = ?, default_queue_name = ?,
                default_node_count = ?, default_cpu_count = ?, default_walltime = ?,
                editable_by_user = ?
            WHERE app_deployment_id = ?
            ",
        )
        .bind(&deployment.app_module_id)
        .bind(&deployment.compute_host_id)
        .bind(&deployment.executable_path)
        .bind(deployment.parallelism.as_str())
        .bind(&deployment.app_deployment_description)
        .bind(&deployment.default_queue_name)
        .bind(deployment.default_node_count)
        .bind(deployment.default_cpu_count)
        .bind(deployment.default_walltime)
        .bind(deployment.editable_by_user)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("application deployment {id}"))?;
        replace_children(&mut tx, deployment).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM app_deployments WHERE app_deployment_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("application deployment {id}"))
    }

    async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        row_exists(
            &mut conn,
            "SELECT EXISTS(SELECT 1 FROM app_deployments WHERE app_deployment_id = ?)",
            &[id],
        )
        .await
    }

    async fn list(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<ApplicationDeploymentDescription>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {DEPLOYMENT_COLUMNS} FROM app_deployments"));
        query.push(" WHERE gateway_id = ").push_bind(gateway_id);
        self.fetch(query).await
    }

    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<ApplicationDeploymentDescription>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {DEPLOYMENT_COLUMNS} FROM app_deployments"));
        push_filters(&mut query, filters);
        self.fetch(query).await
    }

    async fn list_ids(&self) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar::<_, String>(
            "SELECT app_deployment_id FROM app_deployments ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_accessible(
        &self,
        gateway_id: &str,
        deployment_ids: &[String],
        compute_host_ids: &[String],
    ) -> Result<Vec<ApplicationDeploymentDescription>, RepositoryError> {
        if deployment_ids.is_empty() || compute_host_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {DEPLOYMENT_COLUMNS} FROM app_deployments"));
        query.push(" WHERE gateway_id = ").push_bind(gateway_id);
        query.push(" AND ");
        push_in_list(&mut query, "app_deployment_id", deployment_ids);
        query.push(" AND ");
        push_in_list(&mut query, "compute_host_id", compute_host_ids);
        self.fetch(query).await
    }
}
