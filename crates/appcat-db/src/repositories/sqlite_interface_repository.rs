//! `SQLite` implementation of the application interface repository.
//!
//! Module ids, inputs and outputs are stored in child tables in the order
//! supplied. An update rewrites all three.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use appcat_core::domain::{
    ApplicationInterfaceDescription, InputDataObjectType, OutputDataObjectType,
};
use appcat_core::ports::ApplicationInterfaceRepository;
use appcat_core::{FieldFilter, RepositoryError};

use super::row_mappers::{
    ensure_affected, map_sqlx_error, parse_tag, position, push_filters, row_exists,
};

const INTERFACE_COLUMNS: &str = "application_interface_id, application_name, \
    application_description, archive_working_directory, has_optional_file_inputs";

/// `SQLite` implementation of the application interface repository.
pub struct SqliteInterfaceRepository {
    pool: SqlitePool,
}

impl SqliteInterfaceRepository {
    /// Create a new `SQLite` interface repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(
        &self,
        mut query: QueryBuilder<'_, Sqlite>,
    ) -> Result<Vec<ApplicationInterfaceDescription>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        query.push(" ORDER BY rowid");
        let rows = query
            .build_query_as::<InterfaceRow>()
            .fetch_all(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;

        let mut interfaces = Vec::with_capacity(rows.len());
        for row in rows {
            interfaces.push(hydrate(&mut conn, row).await?);
        }
        Ok(interfaces)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal row types for database queries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct InterfaceRow {
    application_interface_id: String,
    application_name: String,
    application_description: Option<String>,
    archive_working_directory: bool,
    has_optional_file_inputs: bool,
}

#[derive(sqlx::FromRow)]
struct InputRow {
    name: String,
    value: Option<String>,
    data_type: String,
    application_argument: Option<String>,
    standard_input: bool,
    user_friendly_description: Option<String>,
    meta_data: Option<String>,
    input_order: i32,
    is_required: bool,
    required_to_added_to_command_line: bool,
    data_staged: bool,
    storage_resource_id: Option<String>,
    is_read_only: bool,
    override_filename: Option<String>,
}

impl InputRow {
    fn into_domain(self) -> Result<InputDataObjectType, RepositoryError> {
        Ok(InputDataObjectType {
            data_type: parse_tag(&self.data_type)?,
            name: self.name,
            value: self.value,
            application_argument: self.application_argument,
            standard_input: self.standard_input,
            user_friendly_description: self.user_friendly_description,
            meta_data: self.meta_data,
            input_order: self.input_order,
            is_required: self.is_required,
            required_to_added_to_command_line: self.required_to_added_to_command_line,
            data_staged: self.data_staged,
            storage_resource_id: self.storage_resource_id,
            is_read_only: self.is_read_only,
            override_filename: self.override_filename,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OutputRow {
    name: String,
    value: Option<String>,
    data_type: String,
    application_argument: Option<String>,
    is_required: bool,
    required_to_added_to_command_line: bool,
    data_movement: bool,
    location: Option<String>,
    search_query: Option<String>,
    output_streaming: bool,
    storage_resource_id: Option<String>,
    meta_data: Option<String>,
}

impl OutputRow {
    fn into_domain(self) -> Result<OutputDataObjectType, RepositoryError> {
        Ok(OutputDataObjectType {
            data_type: parse_tag(&self.data_type)?,
            name: self.name,
            value: self.value,
            application_argument: self.application_argument,
            is_required: self.is_required,
            required_to_added_to_command_line: self.required_to_added_to_command_line,
            data_movement: self.data_movement,
            location: self.location,
            search_query: self.search_query,
            output_streaming: self.output_streaming,
            storage_resource_id: self.storage_resource_id,
            meta_data: self.meta_data,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

async fn hydrate(
    conn: &mut SqliteConnection,
    row: InterfaceRow,
) -> Result<ApplicationInterfaceDescription, RepositoryError> {
    let id = row.application_interface_id.as_str();

    let application_modules = sqlx::query_scalar::<_, String>(
        "SELECT app_module_id FROM app_interface_modules WHERE application_interface_id = ? ORDER BY position",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let application_inputs = sqlx::query_as::<_, InputRow>(
        r"
        SELECT name, value, data_type, application_argument, standard_input,
               user_friendly_description, meta_data, input_order, is_required,
               required_to_added_to_command_line, data_staged, storage_resource_id,
               is_read_only, override_filename
        FROM app_inputs WHERE application_interface_id = ? ORDER BY position
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(InputRow::into_domain)
    .collect::<Result<_, _>>()?;

    let application_outputs = sqlx::query_as::<_, OutputRow>(
        r"
        SELECT name, value, data_type, application_argument, is_required,
               required_to_added_to_command_line, data_movement, location, search_query,
               output_streaming, storage_resource_id, meta_data
        FROM app_outputs WHERE application_interface_id = ? ORDER BY position
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(OutputRow::into_domain)
    .collect::<Result<_, _>>()?;

    Ok(ApplicationInterfaceDescription {
        application_interface_id: row.application_interface_id,
        application_name: row.application_name,
        application_description: row.application_description,
        application_modules,
        application_inputs,
        application_outputs,
        archive_working_directory: row.archive_working_directory,
        has_optional_file_inputs: row.has_optional_file_inputs,
    })
}

async fn insert_module_mapping(
    conn: &mut SqliteConnection,
    interface_id: &str,
    index: Option<usize>,
    module_id: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO app_interface_modules (application_interface_id, position, app_module_id)
        VALUES (?, COALESCE(?, (
            SELECT COALESCE(MAX(position) + 1, 0) FROM app_interface_modules
            WHERE application_interface_id = ?
        )), ?)
        ",
    )
    .bind(interface_id)
    .bind(index.map(position))
    .bind(interface_id)
    .bind(module_id)
    .execute(conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}

async fn replace_children(
    conn: &mut SqliteConnection,
    interface: &ApplicationInterfaceDescription,
) -> Result<(), RepositoryError> {
    let id = interface.application_interface_id.as_str();
    for table in ["app_interface_modules", "app_inputs", "app_outputs"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE application_interface_id = ?"))
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }

    for (index, module_id) in interface.application_modules.iter().enumerate() {
        insert_module_mapping(conn, id, Some(index), module_id).await?;
    }

    for (index, input) in interface.application_inputs.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO app_inputs (
                application_interface_id, name, position, value, data_type,
                application_argument, standard_input, user_friendly_description, meta_data,
                input_order, is_required, required_to_added_to_command_line, data_staged,
                storage_resource_id, is_read_only, override_filename
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(position(index))
        .bind(&input.value)
        .bind(input.data_type.as_str())
        .bind(&input.application_argument)
        .bind(input.standard_input)
        .bind(&input.user_friendly_description)
        .bind(&input.meta_data)
        .bind(input.input_order)
        .bind(input.is_required)
        .bind(input.required_to_added_to_command_line)
        .bind(input.data_staged)
        .bind(&input.storage_resource_id)
        .bind(input.is_read_only)
        .bind(&input.override_filename)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }

    for (index, output) in interface.application_outputs.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO app_outputs (
                application_interface_id, name, position, value, data_type,
                application_argument, is_required, required_to_added_to_command_line,
                data_movement, location, search_query, output_streaming, storage_resource_id,
                meta_data
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(id)
        .bind(&output.name)
        .bind(position(index))
        .bind(&output.value)
        .bind(output.data_type.as_str())
        .bind(&output.application_argument)
        .bind(output.is_required)
        .bind(output.required_to_added_to_command_line)
        .bind(output.data_movement)
        .bind(&output.location)
        .bind(&output.search_query)
        .bind(output.output_streaming)
        .bind(&output.storage_resource_id)
        .bind(&output.meta_data)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ApplicationInterfaceRepository for SqliteInterfaceRepository {
    async fn insert(
        &self,
        interface: &ApplicationInterfaceDescription,
        gateway_id: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r"
            INSERT INTO app_interfaces (
                application_interface_id, application_name, application_description,
                archive_working_directory, has_optional_file_inputs, gateway_id
            ) VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&interface.application_interface_id)
        .bind(&interface.application_name)
        .bind(&interface.application_description)
        .bind(interface.archive_working_directory)
        .bind(interface.has_optional_file_inputs)
        .bind(gateway_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        replace_children(&mut tx, interface).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get(&self, id: &str) -> Result<ApplicationInterfaceDescription, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, InterfaceRow>(&format!(
            "SELECT {INTERFACE_COLUMNS} FROM app_interfaces WHERE application_interface_id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| RepositoryError::NotFound(format!("application interface {id}")))?;

        hydrate(&mut conn, row).await
    }

    async fn update(
        &self,
        interface: &ApplicationInterfaceDescription,
    ) -> Result<(), RepositoryError> {
        let id = interface.application_interface_id.as_str();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r"
            UPDATE app_interfaces
            SET application_name = ?, application_description = ?,
                archive_working_directory = ?, has_optional_file_inputs = ?
            WHERE application_interface_id = ?
            ",
        )
        .bind(&interface.application_name)
        .bind(&interface.application_description)
        .bind(interface.archive_working_directory)
        .bind(interface.has_optional_file_inputs)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("application interface {id}"))?;
        replace_children(&mut tx, interface).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM app_interfaces WHERE application_interface_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        ensure_affected(result.rows_affected(), || format!("application interface {id}"))
    }

    async fn list(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<ApplicationInterfaceDescription>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {INTERFACE_COLUMNS} FROM app_interfaces"));
        query.push(" WHERE gateway_id = ").push_bind(gateway_id);
        self.fetch(query).await
    }

    async fn filter(
        &self,
        filters: &[FieldFilter],
    ) -> Result<Vec<ApplicationInterfaceDescription>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {INTERFACE_COLUMNS} FROM app_interfaces"));
        push_filters(&mut query, filters);
        self.fetch(query).await
    }

    async fn list_ids(&self) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar("SELECT application_interface_id FROM app_interfaces ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn add_module_mapping(
        &self,
        interface_id: &str,
        module_id: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let exists = row_exists(
            &mut tx,
            "SELECT EXISTS(SELECT 1 FROM app_interfaces WHERE application_interface_id = ?)",
            &[interface_id],
        )
        .await?;
        if !exists {
            return Err(RepositoryError::NotFound(format!(
                "application interface {interface_id}"
            )));
        }
        insert_module_mapping(&mut tx, interface_id, None, module_id).await?;
        tx.commit().await.map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use appcat_core::domain::DataType;

    fn interface(id: &str) -> ApplicationInterfaceDescription {
        ApplicationInterfaceDescription {
            application_interface_id: id.to_string(),
            application_name: "Echo".to_string(),
            application_modules: vec!["m1".to_string()],
            application_inputs: vec![
                InputDataObjectType {
                    name: "message".to_string(),
                    data_type: DataType::String,
                    input_order: 1,
                    is_required: true,
                    ..InputDataObjectType::default()
                },
                InputDataObjectType {
                    name: "count".to_string(),
                    data_type: DataType::Integer,
                    input_order: 2,
                    ..InputDataObjectType::default()
                },
            ],
            application_outputs: vec![OutputDataObjectType {
                name: "stdout".to_string(),
                data_type: DataType::Stdout,
                ..OutputDataObjectType::default()
            }],
            ..ApplicationInterfaceDescription::default()
        }
    }

    #[tokio::test]
    async fn test_round_trip_keeps_child_order() {
        let repo = SqliteInterfaceRepository::new(setup_test_database().await.unwrap());
        repo.insert(&interface("i1"), "gw").await.unwrap();

        let stored = repo.get("i1").await.unwrap();
        assert_eq!(stored, interface("i1"));
        assert_eq!(stored.application_inputs[1].name, "count");
    }

    #[tokio::test]
    async fn test_update_replaces_children() {
        let repo = SqliteInterfaceRepository::new(setup_test_database().await.unwrap());
        repo.insert(&interface("i1"), "gw").await.unwrap();

        let mut updated = interface("i1");
        updated.application_inputs.truncate(1);
        updated.application_outputs.clear();
        updated.application_modules = vec!["m2".to_string(), "m3".to_string()];
        repo.update(&updated).await.unwrap();

        assert_eq!(repo.get("i1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_module_mapping_appends() {
        let repo = SqliteInterfaceRepository::new(setup_test_database().await.unwrap());
        repo.insert(&interface("i1"), "gw").await.unwrap();

        repo.add_module_mapping("i1", "m9").await.unwrap();
        let missing = repo.add_module_mapping("ghost", "m9").await.unwrap_err();

        assert_eq!(repo.get("i1").await.unwrap().application_modules, ["m1", "m9"]);
        assert!(matches!(missing, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_and_ids() {
        let repo = SqliteInterfaceRepository::new(setup_test_database().await.unwrap());
        repo.insert(&interface("i1"), "gw").await.unwrap();
        repo.insert(&interface("i2"), "other").await.unwrap();

        assert_eq!(repo.list_ids().await.unwrap(), ["i1", "i2"]);
        assert_eq!(repo.list("other").await.unwrap().len(), 1);

        repo.delete("i1").await.unwrap();
        assert!(matches!(repo.delete("i1").await.unwrap_err(), RepositoryError::NotFound(_)));
        let orphans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM app_inputs WHERE application_interface_id = 'i1'",
        )
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(orphans, 0);
    }
}
