//! Database setup and initialization.
//!
//! This module provides the `setup_database()` function for opening the
//! catalog database, creating the schema and seeding the default gateway
//! profile. Entry points call it with the resolved `CatalogConfig`.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use appcat_core::CatalogConfig;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info};

/// Sets up the `SQLite` database connection and ensures the schema exists.
///
/// This function:
/// 1. Validates the configuration
/// 2. Creates the database file (and its parent directory) if missing
/// 3. Creates all tables and indexes
/// 4. Seeds the default gateway resource profile
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the database cannot be
/// opened, or schema creation fails.
///
/// # Example
///
/// ```rust,no_run
/// use appcat_core::CatalogConfig;
/// use appcat_db::setup_database;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = setup_database(&CatalogConfig::from_env()?).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(config: &CatalogConfig) -> Result<SqlitePool> {
    config.validate()?;

    let options = connect_options(&config.database_url)?;
    if !config.is_in_memory() {
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
    }

    let pool = pool_options(config)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open catalog database {}", config.database_url))?;

    create_schema(&pool).await?;
    seed_defaults(&pool, &config.default_gateway_id).await?;

    info!(database = %config.database_url, "Catalog database ready");
    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// Creates a fresh in-memory database with the full production schema and
/// the default gateway profile.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    setup_database(&CatalogConfig::in_memory()).await
}

/// Accepts both `sqlite:` URLs and plain file paths.
fn connect_options(database_url: &str) -> Result<SqliteConnectOptions> {
    let options = if database_url.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL {database_url}"))?
    } else {
        SqliteConnectOptions::new().filename(database_url)
    };
    Ok(options.create_if_missing(true).foreign_keys(true))
}

/// An in-memory database only lives as long as its single connection.
fn pool_options(config: &CatalogConfig) -> SqlitePoolOptions {
    let options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(30));
    if config.is_in_memory() {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options.max_connections(config.max_connections)
    }
}

/// Creates the complete database schema.
///
/// Safe to call multiple times as every statement uses IF NOT EXISTS.
pub(crate) async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to apply schema statement: {statement}"))?;
    }
    debug!(statements = SCHEMA.len(), "Schema applied");
    Ok(())
}

/// Every fresh catalog starts with an empty profile for the default gateway.
async fn seed_defaults(pool: &SqlitePool, default_gateway_id: &str) -> Result<()> {
    let result = sqlx::query("INSERT OR IGNORE INTO gateway_profiles (gateway_id) VALUES (?)")
        .bind(default_gateway_id)
        .execute(pool)
        .await?;
    if result.rows_affected() > 0 {
        info!(gateway_id = default_gateway_id, "Seeded default gateway profile");
    }
    Ok(())
}

const SCHEMA: &[&str] = &[
    // ── Compute resources ───────────────────────────────────────────────────
    r"
    CREATE TABLE IF NOT EXISTS compute_resources (
        compute_resource_id TEXT PRIMARY KEY NOT NULL,
        host_name TEXT NOT NULL,
        host_aliases TEXT NOT NULL DEFAULT '[]',
        ip_addresses TEXT NOT NULL DEFAULT '[]',
        resource_description TEXT,
        enabled INTEGER NOT NULL DEFAULT 1,
        max_memory_per_node INTEGER,
        gateway_usage_reporting INTEGER NOT NULL DEFAULT 0,
        gateway_usage_module_load_command TEXT,
        gateway_usage_executable TEXT,
        cpus_per_node INTEGER,
        default_node_count INTEGER,
        default_cpu_count INTEGER,
        default_walltime INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_compute_resources_host ON compute_resources(host_name)",
    r"
    CREATE TABLE IF NOT EXISTS batch_queues (
        compute_resource_id TEXT NOT NULL,
        queue_name TEXT NOT NULL,
        position INTEGER NOT NULL,
        queue_description TEXT,
        max_run_time INTEGER,
        max_nodes INTEGER,
        max_processors INTEGER,
        max_jobs_in_queue INTEGER,
        max_memory INTEGER,
        cpu_per_node INTEGER,
        default_node_count INTEGER,
        default_cpu_count INTEGER,
        default_walltime INTEGER,
        queue_specific_macros TEXT,
        is_default_queue INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (compute_resource_id, queue_name),
        FOREIGN KEY (compute_resource_id)
            REFERENCES compute_resources(compute_resource_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS compute_file_systems (
        compute_resource_id TEXT NOT NULL,
        file_system TEXT NOT NULL,
        path TEXT NOT NULL,
        PRIMARY KEY (compute_resource_id, file_system),
        FOREIGN KEY (compute_resource_id)
            REFERENCES compute_resources(compute_resource_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS job_submission_interfaces (
        compute_resource_id TEXT NOT NULL,
        job_submission_interface_id TEXT NOT NULL,
        job_submission_protocol TEXT NOT NULL,
        priority_order INTEGER NOT NULL DEFAULT 0,
        position INTEGER NOT NULL,
        PRIMARY KEY (compute_resource_id, job_submission_interface_id),
        FOREIGN KEY (compute_resource_id)
            REFERENCES compute_resources(compute_resource_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS compute_data_movement_interfaces (
        compute_resource_id TEXT NOT NULL,
        data_movement_interface_id TEXT NOT NULL,
        data_movement_protocol TEXT NOT NULL,
        priority_order INTEGER NOT NULL DEFAULT 0,
        position INTEGER NOT NULL,
        PRIMARY KEY (compute_resource_id, data_movement_interface_id),
        FOREIGN KEY (compute_resource_id)
            REFERENCES compute_resources(compute_resource_id) ON DELETE CASCADE
    )
    ",
    // ── Submission and data movement configurations ─────────────────────────
    r"
    CREATE TABLE IF NOT EXISTS resource_job_managers (
        resource_job_manager_id TEXT PRIMARY KEY NOT NULL,
        resource_job_manager_type TEXT NOT NULL,
        push_monitoring_endpoint TEXT,
        job_manager_bin_path TEXT
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS job_manager_commands (
        resource_job_manager_id TEXT NOT NULL,
        command_type TEXT NOT NULL,
        command TEXT NOT NULL,
        PRIMARY KEY (resource_job_manager_id, command_type),
        FOREIGN KEY (resource_job_manager_id)
            REFERENCES resource_job_managers(resource_job_manager_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS parallelism_prefixes (
        resource_job_manager_id TEXT NOT NULL,
        parallelism_type TEXT NOT NULL,
        prefix TEXT NOT NULL,
        PRIMARY KEY (resource_job_manager_id, parallelism_type),
        FOREIGN KEY (resource_job_manager_id)
            REFERENCES resource_job_managers(resource_job_manager_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS ssh_job_submissions (
        job_submission_interface_id TEXT PRIMARY KEY NOT NULL,
        security_protocol TEXT NOT NULL,
        resource_job_manager_id TEXT NOT NULL
            REFERENCES resource_job_managers(resource_job_manager_id),
        alternative_ssh_host_name TEXT,
        ssh_port INTEGER,
        monitor_mode TEXT
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS local_submissions (
        job_submission_interface_id TEXT PRIMARY KEY NOT NULL,
        security_protocol TEXT NOT NULL,
        resource_job_manager_id TEXT NOT NULL
            REFERENCES resource_job_managers(resource_job_manager_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS cloud_job_submissions (
        job_submission_interface_id TEXT PRIMARY KEY NOT NULL,
        security_protocol TEXT NOT NULL,
        node_id TEXT NOT NULL,
        executable_type TEXT NOT NULL,
        provider_name TEXT NOT NULL,
        user_account_name TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS unicore_job_submissions (
        job_submission_interface_id TEXT PRIMARY KEY NOT NULL,
        security_protocol TEXT NOT NULL,
        unicore_end_point_url TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS scp_data_movements (
        data_movement_interface_id TEXT PRIMARY KEY NOT NULL,
        security_protocol TEXT NOT NULL,
        alternative_scp_host_name TEXT,
        ssh_port INTEGER
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS gridftp_data_movements (
        data_movement_interface_id TEXT PRIMARY KEY NOT NULL,
        security_protocol TEXT NOT NULL,
        grid_ftp_end_points TEXT NOT NULL DEFAULT '[]'
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS unicore_data_movements (
        data_movement_interface_id TEXT PRIMARY KEY NOT NULL,
        security_protocol TEXT NOT NULL,
        unicore_end_point_url TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS local_data_movements (
        data_movement_interface_id TEXT PRIMARY KEY NOT NULL
    )
    ",
    // ── Storage resources ───────────────────────────────────────────────────
    r"
    CREATE TABLE IF NOT EXISTS storage_resources (
        storage_resource_id TEXT PRIMARY KEY NOT NULL,
        host_name TEXT NOT NULL,
        storage_resource_description TEXT,
        enabled INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS storage_data_movement_interfaces (
        storage_resource_id TEXT NOT NULL,
        data_movement_interface_id TEXT NOT NULL,
        data_movement_protocol TEXT NOT NULL,
        priority_order INTEGER NOT NULL DEFAULT 0,
        position INTEGER NOT NULL,
        PRIMARY KEY (storage_resource_id, data_movement_interface_id),
        FOREIGN KEY (storage_resource_id)
            REFERENCES storage_resources(storage_resource_id) ON DELETE CASCADE
    )
    ",
    // ── Applications ────────────────────────────────────────────────────────
    r"
    CREATE TABLE IF NOT EXISTS app_modules (
        app_module_id TEXT PRIMARY KEY NOT NULL,
        app_module_name TEXT NOT NULL,
        app_module_version TEXT,
        app_module_description TEXT,
        gateway_id TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_app_modules_gateway ON app_modules(gateway_id)",
    r"
    CREATE TABLE IF NOT EXISTS app_interfaces (
        application_interface_id TEXT PRIMARY KEY NOT NULL,
        application_name TEXT NOT NULL,
        application_description TEXT,
        archive_working_directory INTEGER NOT NULL DEFAULT 0,
        has_optional_file_inputs INTEGER NOT NULL DEFAULT 0,
        gateway_id TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS app_interface_modules (
        application_interface_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        app_module_id TEXT NOT NULL,
        PRIMARY KEY (application_interface_id, position),
        FOREIGN KEY (application_interface_id)
            REFERENCES app_interfaces(application_interface_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS app_inputs (
        application_interface_id TEXT NOT NULL,
        name TEXT NOT NULL,
        position INTEGER NOT NULL,
        value TEXT,
        data_type TEXT NOT NULL,
        application_argument TEXT,
        standard_input INTEGER NOT NULL DEFAULT 0,
        user_friendly_description TEXT,
        meta_data TEXT,
        input_order INTEGER NOT NULL DEFAULT 0,
        is_required INTEGER NOT NULL DEFAULT 0,
        required_to_added_to_command_line INTEGER NOT NULL DEFAULT 0,
        data_staged INTEGER NOT NULL DEFAULT 0,
        storage_resource_id TEXT,
        is_read_only INTEGER NOT NULL DEFAULT 0,
        override_filename TEXT,
        PRIMARY KEY (application_interface_id, name),
        FOREIGN KEY (application_interface_id)
            REFERENCES app_interfaces(application_interface_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS app_outputs (
        application_interface_id TEXT NOT NULL,
        name TEXT NOT NULL,
        position INTEGER NOT NULL,
        value TEXT,
        data_type TEXT NOT NULL,
        application_argument TEXT,
        is_required INTEGER NOT NULL DEFAULT 0,
        required_to_added_to_command_line INTEGER NOT NULL DEFAULT 0,
        data_movement INTEGER NOT NULL DEFAULT 0,
        location TEXT,
        search_query TEXT,
        output_streaming INTEGER NOT NULL DEFAULT 0,
        storage_resource_id TEXT,
        meta_data TEXT,
        PRIMARY KEY (application_interface_id, name),
        FOREIGN KEY (application_interface_id)
            REFERENCES app_interfaces(application_interface_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS app_deployments (
        app_deployment_id TEXT PRIMARY KEY NOT NULL,
        app_module_id TEXT NOT NULL,
        compute_host_id TEXT NOT NULL,
        executable_path TEXT NOT NULL,
        parallelism TEXT NOT NULL,
        app_deployment_description TEXT,
        default_queue_name TEXT,
        default_node_count INTEGER,
        default_cpu_count INTEGER,
        default_walltime INTEGER,
        editable_by_user INTEGER NOT NULL DEFAULT 0,
        gateway_id TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_app_deployments_module ON app_deployments(app_module_id)",
    r"
    CREATE TABLE IF NOT EXISTS deployment_commands (
        app_deployment_id TEXT NOT NULL,
        kind TEXT NOT NULL CHECK (kind IN ('module_load', 'pre_job', 'post_job')),
        position INTEGER NOT NULL,
        command TEXT NOT NULL,
        command_order INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (app_deployment_id, kind, position),
        FOREIGN KEY (app_deployment_id)
            REFERENCES app_deployments(app_deployment_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS deployment_environment (
        app_deployment_id TEXT NOT NULL,
        kind TEXT NOT NULL CHECK (kind IN ('lib_prepend', 'lib_append', 'set_env')),
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        value TEXT NOT NULL,
        env_path_order INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (app_deployment_id, kind, position),
        FOREIGN KEY (app_deployment_id)
            REFERENCES app_deployments(app_deployment_id) ON DELETE CASCADE
    )
    ",
    // ── Gateway resource profiles ───────────────────────────────────────────
    r"
    CREATE TABLE IF NOT EXISTS gateway_profiles (
        gateway_id TEXT PRIMARY KEY NOT NULL,
        credential_store_token TEXT,
        identity_server_tenant TEXT,
        identity_server_pwd_cred_token TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS gateway_compute_preferences (
        gateway_id TEXT NOT NULL,
        compute_resource_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        override_by_airavata INTEGER NOT NULL DEFAULT 0,
        login_user_name TEXT,
        preferred_job_submission_protocol TEXT,
        preferred_data_movement_protocol TEXT,
        preferred_batch_queue TEXT,
        scratch_location TEXT,
        allocation_project_number TEXT,
        resource_specific_credential_store_token TEXT,
        usage_reporting_gateway_id TEXT,
        quality_of_service TEXT,
        reservation TEXT,
        reservation_start_time INTEGER,
        reservation_end_time INTEGER,
        PRIMARY KEY (gateway_id, compute_resource_id),
        FOREIGN KEY (gateway_id) REFERENCES gateway_profiles(gateway_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS gateway_storage_preferences (
        gateway_id TEXT NOT NULL,
        storage_resource_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        login_user_name TEXT,
        file_system_root_location TEXT,
        resource_specific_credential_store_token TEXT,
        PRIMARY KEY (gateway_id, storage_resource_id),
        FOREIGN KEY (gateway_id) REFERENCES gateway_profiles(gateway_id) ON DELETE CASCADE
    )
    ",
    // ── Group resource profiles ─────────────────────────────────────────────
    r"
    CREATE TABLE IF NOT EXISTS group_profiles (
        group_resource_profile_id TEXT PRIMARY KEY NOT NULL,
        gateway_id TEXT NOT NULL,
        group_resource_profile_name TEXT,
        default_credential_store_token TEXT,
        creation_time TEXT,
        updated_time TEXT
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_group_profiles_gateway ON group_profiles(gateway_id)",
    r"
    CREATE TABLE IF NOT EXISTS group_compute_preferences (
        group_resource_profile_id TEXT NOT NULL,
        compute_resource_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        override_by_airavata INTEGER NOT NULL DEFAULT 0,
        login_user_name TEXT,
        preferred_job_submission_protocol TEXT,
        preferred_data_movement_protocol TEXT,
        preferred_batch_queue TEXT,
        scratch_location TEXT,
        allocation_project_number TEXT,
        resource_specific_credential_store_token TEXT,
        usage_reporting_gateway_id TEXT,
        quality_of_service TEXT,
        PRIMARY KEY (group_resource_profile_id, compute_resource_id),
        FOREIGN KEY (group_resource_profile_id)
            REFERENCES group_profiles(group_resource_profile_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS group_reservations (
        group_resource_profile_id TEXT NOT NULL,
        compute_resource_id TEXT NOT NULL,
        reservation_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        reservation_name TEXT NOT NULL,
        start_time INTEGER NOT NULL,
        end_time INTEGER NOT NULL,
        queue_names TEXT NOT NULL DEFAULT '[]',
        PRIMARY KEY (group_resource_profile_id, compute_resource_id, reservation_id),
        FOREIGN KEY (group_resource_profile_id, compute_resource_id)
            REFERENCES group_compute_preferences(group_resource_profile_id, compute_resource_id)
            ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS group_compute_policies (
        resource_policy_id TEXT PRIMARY KEY NOT NULL,
        group_resource_profile_id TEXT NOT NULL,
        compute_resource_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        allowed_batch_queues TEXT NOT NULL DEFAULT '[]',
        FOREIGN KEY (group_resource_profile_id)
            REFERENCES group_profiles(group_resource_profile_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS group_batch_queue_policies (
        resource_policy_id TEXT PRIMARY KEY NOT NULL,
        group_resource_profile_id TEXT NOT NULL,
        compute_resource_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        queuename TEXT,
        max_allowed_nodes INTEGER,
        max_allowed_cores INTEGER,
        max_allowed_walltime INTEGER,
        FOREIGN KEY (group_resource_profile_id)
            REFERENCES group_profiles(group_resource_profile_id) ON DELETE CASCADE
    )
    ",
    // ── User resource profiles ──────────────────────────────────────────────
    r"
    CREATE TABLE IF NOT EXISTS user_profiles (
        user_id TEXT NOT NULL,
        gateway_id TEXT NOT NULL,
        credential_store_token TEXT,
        identity_server_tenant TEXT,
        identity_server_pwd_cred_token TEXT,
        PRIMARY KEY (user_id, gateway_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS user_compute_preferences (
        user_id TEXT NOT NULL,
        gateway_id TEXT NOT NULL,
        compute_resource_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        login_user_name TEXT,
        preferred_batch_queue TEXT,
        scratch_location TEXT,
        allocation_project_number TEXT,
        resource_specific_credential_store_token TEXT,
        quality_of_service TEXT,
        reservation TEXT,
        reservation_start_time INTEGER,
        reservation_end_time INTEGER,
        validated INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (user_id, gateway_id, compute_resource_id),
        FOREIGN KEY (user_id, gateway_id)
            REFERENCES user_profiles(user_id, gateway_id) ON DELETE CASCADE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS user_storage_preferences (
        user_id TEXT NOT NULL,
        gateway_id TEXT NOT NULL,
        storage_resource_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        login_user_name TEXT,
        file_system_root_location TEXT,
        resource_specific_credential_store_token TEXT,
        PRIMARY KEY (user_id, gateway_id, storage_resource_id),
        FOREIGN KEY (user_id, gateway_id)
            REFERENCES user_profiles(user_id, gateway_id) ON DELETE CASCADE
    )
    ",
    // ── Gateway groups ──────────────────────────────────────────────────────
    r"
    CREATE TABLE IF NOT EXISTS gateway_groups (
        gateway_id TEXT PRIMARY KEY NOT NULL,
        admins_group_id TEXT NOT NULL,
        read_only_admins_group_id TEXT NOT NULL,
        default_gateway_users_group_id TEXT NOT NULL
    )
    ",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_test_database() {
        let pool = setup_test_database().await.unwrap();

        let gateways: Vec<String> = sqlx::query_scalar("SELECT gateway_id FROM gateway_profiles")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(gateways, vec!["default".to_string()]);
    }

    #[tokio::test]
    async fn test_setup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");
        let config = CatalogConfig {
            database_url: path.to_string_lossy().into_owned(),
            default_gateway_id: "seagrid".to_string(),
            ..CatalogConfig::with_defaults()
        };

        let first = setup_database(&config).await.unwrap();
        first.close().await;
        let second = setup_database(&config).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM gateway_profiles")
            .fetch_one(&second)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = CatalogConfig {
            max_connections: 0,
            ..CatalogConfig::in_memory()
        };
        assert!(tokio_test::block_on(setup_database(&config)).is_err());
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let pool = setup_test_database().await.unwrap();

        let result = sqlx::query(
            "INSERT INTO batch_queues (compute_resource_id, queue_name, position) VALUES (?, ?, 0)",
        )
        .bind("ghost")
        .bind("normal")
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }
}
