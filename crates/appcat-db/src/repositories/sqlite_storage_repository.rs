//! `SQLite` implementation of the storage resource repository.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use appcat_core::domain::{DataMovementInterface, ResourceChildKey, StorageResourceDescription};
use appcat_core::ports::StorageResourceRepository;
use appcat_core::{FieldFilter, RepositoryError};

use super::row_mappers::{ensure_affected, map_sqlx_error, position, push_filters, row_exists};
use super::sqlite_compute_repository::DataMovementInterfaceRow;

/// `SQLite` implementation of the storage resource repository.
pub struct SqliteStorageResourceRepository {
    pool: SqlitePool,
}

impl SqliteStorageResourceRepository {
    /// Create a new `SQLite` storage resource repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StorageResourceRow {
    storage_resource_id: String,
    host_name: String,
    storage_resource_description: Option<String>,
    enabled: bool,
}

async fn hydrate(
    conn: &mut SqliteConnection,
    row: StorageResourceRow,
) -> Result<StorageResourceDescription, RepositoryError> {
    let data_movement_interfaces = sqlx::query_as::<_, DataMovementInterfaceRow>(
        r"
        SELECT data_movement_interface_id, data_movement_protocol, priority_order
        FROM storage_data_movement_interfaces WHERE storage_resource_id = ? ORDER BY position
        ",
    )
    .bind(&row.storage_resource_id)
    .fetch_all(conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(DataMovementInterfaceRow::into_domain)
    .collect::<Result<_, RepositoryError>>()?;

    Ok(StorageResourceDescription {
        storage_resource_id: row.storage_resource_id,
        host_name: row.host_name,
        storage_resource_description: row.storage_resource_description,
        enabled: row.enabled,
        data_movement_interfaces,
    })
}

async fn insert_interface(
    conn: &mut SqliteConnection,
    resource_id: &str,
    index: Option<usize>,
    interface: &DataMovementInterface,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO storage_data_movement_interfaces (
            storage_resource_id, data_movement_interface_id, data_movement_protocol,
            priority_order, position
        ) VALUES (?, ?, ?, ?, COALESCE(?, (
            SELECT COALESCE(MAX(position) + 1, 0) FROM storage_data_movement_interfaces
            WHERE storage_resource_id = ?
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
    resource: &StorageResourceDescription,
) -> Result<(), RepositoryError> {
    let id = resource.storage_resource_id.as_str();
    sqlx::query("DELETE FROM storage_data_movement_interfaces WHERE storage_resource_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    for (index, interface) in resource.data_movement_interfaces.iter().enumerate() {
        insert_interface(conn, id, Some(index), interface).await?;
    }
    Ok(())
}

async fn storage_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool, RepositoryError> {
    row_exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM storage_resources WHERE storage_resource_id = ?)",
        &[id],
    )
    .await
}

#[async_trait]
impl StorageResourceRepository for SqliteStorageResourceRepository {
    async fn insert(&self, resource: &StorageResourceDescription) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r"
            INSERT INTO storage_resources (
                storage_resource_id, host_name, storage_resource_description, enabled
            ) VALUES (?, ?, ?, ?)
            ",
        )
        .bind(&resource.storage_resource_id)
        .bind(&resource.host_name)
        .bind(&resource.storage_resource_description)
        .bind(resource.enabled)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        replace_interfaces(&mut tx, resource).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get(&self, id: &str) -> Result<StorageResourceDescription, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, StorageResourceRow>(
            r"
            SELECT storage_resource_id, host_name, storage_resource_description, enabled
            FROM storage_resources WHERE storage_resource_id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("storage resource {id}")))?;

        hydrate(&mut conn, row).await
    }

    async fn update(&self, resource: &StorageResourceDescription) -> Result<(), RepositoryError> {
        let id = resource.storage_resource_id.as_str();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r"
            UPDATE storage_resources
            SET host_name = ?, storage_resource_description = ?, enabled = ?
            WHERE storage_resource_id = ?
            ",
        )
        .bind(&resource.host_name)
        .bind(&resource.storage_resource_description)
        .bind(resource.enabled)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("storage resource {id}"))?;
        replace_interfaces(&mut tx, resource).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storage_resources WHERE storage_resource_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("storage resource {id}"))
    }

    async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        storage_exists(&mut conn, id).await
    }

    async fn list(&self) -> Result<Vec<StorageResourceDescription>, RepositoryError> {
        self.filter(&[]).await
    }

    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<StorageResourceDescription>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT storage_resource_id, host_name, storage_resource_description, enabled \
             FROM storage_resources",
        );
        push_filters(&mut query, filters);
        query.push(" ORDER BY rowid");

        let rows = query
            .build_query_as::<StorageResourceRow>()
            .fetch_all(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;

        let mut resources = Vec::with_capacity(rows.len());
        for row in rows {
            resources.push(hydrate(&mut conn, row).await?);
        }
        Ok(resources)
    }

    async fn list_names(&self, enabled_only: bool) -> Result<Vec<(String, String)>, RepositoryError> {
        sqlx::query_as::<_, (String, String)>(
            r"
            SELECT storage_resource_id, host_name FROM storage_resources
            WHERE (? = 0 OR enabled = 1)
            ORDER BY rowid
            ",
        )
        .bind(enabled_only)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn add_data_movement_interface(
        &self,
        resource_id: &str,
        interface: &DataMovementInterface,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        if !storage_exists(&mut tx, resource_id).await? {
            return Err(RepositoryError::NotFound(format!("storage resource {resource_id}")));
        }
        insert_interface(&mut tx, resource_id, None, interface).await?;
        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete_data_movement_interface(
        &self,
        key: &ResourceChildKey,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM storage_data_movement_interfaces
            WHERE storage_resource_id = ? AND data_movement_interface_id = ?
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
    use appcat_core::domain::DataMovementProtocol;
    use appcat_core::filter::FilterField;

    fn storage(id: &str, host: &str) -> StorageResourceDescription {
        StorageResourceDescription {
            storage_resource_id: id.to_string(),
            host_name: host.to_string(),
            storage_resource_description: Some("archive".to_string()),
            enabled: true,
            data_movement_interfaces: vec![DataMovementInterface {
                data_movement_interface_id: "gftp-1".to_string(),
                data_movement_protocol: DataMovementProtocol::GridFtp,
                priority_order: 0,
            }],
        }
    }

    async fn repo() -> SqliteStorageResourceRepository {
        SqliteStorageResourceRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let repo = repo().await;
        let mut resource = storage("s1", "store.example.org");
        repo.insert(&resource).await.unwrap();
        assert_eq!(repo.get("s1").await.unwrap(), resource);

        resource.storage_resource_description = None;
        resource.data_movement_interfaces.clear();
        repo.update(&resource).await.unwrap();
        assert_eq!(repo.get("s1").await.unwrap(), resource);

        repo.delete("s1").await.unwrap();
        assert!(!repo.exists("s1").await.unwrap());
        assert!(matches!(
            repo.delete("s1").await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_filter_by_host_name() {
        let repo = repo().await;
        repo.insert(&storage("s1", "a")).await.unwrap();
        repo.insert(&storage("s2", "b")).await.unwrap();

        let filters = [FieldFilter {
            field: FilterField::HostName,
            value: "b".to_string(),
        }];
        let found = repo.filter(&filters).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].storage_resource_id, "s2");
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_append_interface() {
        let repo = repo().await;
        repo.insert(&storage("s1", "a")).await.unwrap();

        let scp = DataMovementInterface {
            data_movement_interface_id: "scp-1".to_string(),
            data_movement_protocol: DataMovementProtocol::Scp,
            priority_order: 1,
        };
        repo.add_data_movement_interface("s1", &scp).await.unwrap();
        repo.delete_data_movement_interface(&ResourceChildKey::new("s1", "gftp-1"))
            .await
            .unwrap();

        assert_eq!(repo.get("s1").await.unwrap().data_movement_interfaces, vec![scp]);
    }
}
