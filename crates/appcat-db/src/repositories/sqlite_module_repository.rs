//! `SQLite` implementation of the application module repository.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use appcat_core::domain::ApplicationModule;
use appcat_core::ports::ApplicationModuleRepository;
use appcat_core::{FieldFilter, RepositoryError};

use super::row_mappers::{ensure_affected, map_sqlx_error, push_filters, push_in_list};

const MODULE_COLUMNS: &str =
    "app_module_id, app_module_name, app_module_version, app_module_description";

/// `SQLite` implementation of the application module repository.
pub struct SqliteModuleRepository {
    pool: SqlitePool,
}

impl SqliteModuleRepository {
    /// Create a new `SQLite` module repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(
        &self,
        mut query: QueryBuilder<'_, Sqlite>,
    ) -> Result<Vec<ApplicationModule>, RepositoryError> {
        query.push(" ORDER BY rowid");
        let rows = query
            .build_query_as::<ModuleRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ApplicationModule::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ModuleRow {
    app_module_id: String,
    app_module_name: String,
    app_module_version: Option<String>,
    app_module_description: Option<String>,
}

impl From<ModuleRow> for ApplicationModule {
    fn from(row: ModuleRow) -> Self {
        Self {
            app_module_id: row.app_module_id,
            app_module_name: row.app_module_name,
            app_module_version: row.app_module_version,
            app_module_description: row.app_module_description,
        }
    }
}

#[async_trait]
impl ApplicationModuleRepository for SqliteModuleRepository {
    async fn insert(
        &self,
        module: &ApplicationModule,
        gateway_id: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO app_modules (
                app_module_id, app_module_name, app_module_version, app_module_description,
                gateway_id
            ) VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(&module.app_module_id)
        .bind(&module.app_module_name)
        .bind(&module.app_module_version)
        .bind(&module.app_module_description)
        .bind(gateway_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<ApplicationModule, RepositoryError> {
        sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {MODULE_COLUMNS} FROM app_modules WHERE app_module_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(ApplicationModule::from)
        .ok_or_else(|| RepositoryError::NotFound(format!("application module {id}")))
    }

    async fn update(&self, module: &ApplicationModule) -> Result<(), RepositoryError> {
        let id = module.app_module_id.as_str();
        let result = sqlx::query(
            r"
            UPDATE app_modules
            SET app_module_name = ?, app_module_version = ?, app_module_description = ?
            WHERE app_module_id = ?
            ",
        )
        .bind(&module.app_module_name)
        .bind(&module.app_module_version)
        .bind(&module.app_module_description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("application module {id}"))
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM app_modules WHERE app_module_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("application module {id}"))
    }

    async fn list(&self, gateway_id: &str) -> Result<Vec<ApplicationModule>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {MODULE_COLUMNS} FROM app_modules"));
        query.push(" WHERE gateway_id = ").push_bind(gateway_id);
        self.fetch(query).await
    }

    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<ApplicationModule>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {MODULE_COLUMNS} FROM app_modules"));
        push_filters(&mut query, filters);
        self.fetch(query).await
    }

    async fn list_accessible(
        &self,
        gateway_id: &str,
        deployment_ids: &[String],
        compute_host_ids: &[String],
    ) -> Result<Vec<ApplicationModule>, RepositoryError> {
        if deployment_ids.is_empty() || compute_host_ids.is_empty() {
            return Ok(Vec::new());
        }

        // A module qualifies once, however many deployments match.
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {MODULE_COLUMNS} FROM app_modules m"));
        query.push(" WHERE m.gateway_id = ").push_bind(gateway_id);
        query.push(
            " AND EXISTS (SELECT 1 FROM app_deployments d \
             WHERE d.app_module_id = m.app_module_id AND ",
        );
        push_in_list(&mut query, "d.app_deployment_id", deployment_ids);
        query.push(" AND ");
        push_in_list(&mut query, "d.compute_host_id", compute_host_ids);
        query.push(")");
        self.fetch(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use appcat_core::filter::FilterField;

    fn module(id: &str, name: &str) -> ApplicationModule {
        ApplicationModule {
            app_module_id: id.to_string(),
            app_module_name: name.to_string(),
            app_module_version: Some("1.0".to_string()),
            app_module_description: None,
        }
    }

    #[tokio::test]
    async fn test_modules_are_scoped_to_gateway() {
        let repo = SqliteModuleRepository::new(setup_test_database().await.unwrap());
        repo.insert(&module("m1", "gromacs"), "gw1").await.unwrap();
        repo.insert(&module("m2", "namd"), "gw2").await.unwrap();

        let gw1 = repo.list("gw1").await.unwrap();
        assert_eq!(gw1, vec![module("m1", "gromacs")]);

        let filters = [FieldFilter {
            field: FilterField::AppModuleName,
            value: "namd".to_string(),
        }];
        assert_eq!(repo.filter(&filters).await.unwrap(), vec![module("m2", "namd")]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = SqliteModuleRepository::new(setup_test_database().await.unwrap());
        let mut m = module("m1", "gromacs");
        repo.insert(&m, "gw").await.unwrap();

        m.app_module_version = None;
        repo.update(&m).await.unwrap();
        assert_eq!(repo.get("m1").await.unwrap(), m);

        repo.delete("m1").await.unwrap();
        assert!(matches!(repo.get("m1").await.unwrap_err(), RepositoryError::NotFound(_)));
        assert!(matches!(repo.update(&m).await.unwrap_err(), RepositoryError::NotFound(_)));
    }
}
