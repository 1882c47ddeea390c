//! `SQLite` implementation of the gateway groups repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use appcat_core::domain::GatewayGroups;
use appcat_core::ports::GatewayGroupsRepository;
use appcat_core::RepositoryError;

use super::row_mappers::{ensure_affected, map_sqlx_error};

/// `SQLite` implementation of the gateway groups repository.
pub struct SqliteGatewayGroupsRepository {
    pool: SqlitePool,
}

impl SqliteGatewayGroupsRepository {
    /// Create a new `SQLite` gateway groups repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct GatewayGroupsRow {
    gateway_id: String,
    admins_group_id: String,
    read_only_admins_group_id: String,
    default_gateway_users_group_id: String,
}

impl From<GatewayGroupsRow> for GatewayGroups {
    fn from(row: GatewayGroupsRow) -> Self {
        Self {
            gateway_id: row.gateway_id,
            admins_group_id: row.admins_group_id,
            read_only_admins_group_id: row.read_only_admins_group_id,
            default_gateway_users_group_id: row.default_gateway_users_group_id,
        }
    }
}

#[async_trait]
impl GatewayGroupsRepository for SqliteGatewayGroupsRepository {
    async fn insert(&self, groups: &GatewayGroups) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO gateway_groups (
                gateway_id, admins_group_id, read_only_admins_group_id,
                default_gateway_users_group_id
            ) VALUES (?, ?, ?, ?)
            ",
        )
        .bind(&groups.gateway_id)
        .bind(&groups.admins_group_id)
        .bind(&groups.read_only_admins_group_id)
        .bind(&groups.default_gateway_users_group_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get(&self, gateway_id: &str) -> Result<GatewayGroups, RepositoryError> {
        sqlx::query_as::<_, GatewayGroupsRow>(
            r"
            SELECT gateway_id, admins_group_id, read_only_admins_group_id,
                   default_gateway_users_group_id
            FROM gateway_groups WHERE gateway_id = ?
            ",
        )
        .bind(gateway_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(GatewayGroups::from)
        .ok_or_else(|| RepositoryError::NotFound(format!("gateway groups {gateway_id}")))
    }

    async fn update(&self, groups: &GatewayGroups) -> Result<(), RepositoryError> {
        let gateway_id = groups.gateway_id.as_str();
        let result = sqlx::query(
            r"
            UPDATE gateway_groups
            SET admins_group_id = ?, read_only_admins_group_id = ?,
                default_gateway_users_group_id = ?
            WHERE gateway_id = ?
            ",
        )
        .bind(&groups.admins_group_id)
        .bind(&groups.read_only_admins_group_id)
        .bind(&groups.default_gateway_users_group_id)
        .bind(gateway_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("gateway groups {gateway_id}"))
    }

    async fn delete(&self, gateway_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM gateway_groups WHERE gateway_id = ?")
            .bind(gateway_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("gateway groups {gateway_id}"))
    }

    async fn exists(&self, gateway_id: &str) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM gateway_groups WHERE gateway_id = ?)",
        )
        .bind(gateway_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}
