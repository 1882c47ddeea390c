//! Application modules, interfaces and deployments.
//!
//! Modules are referenced by id from both interfaces and deployments; neither
//! owns the module it points at.

use serde::{Deserialize, Serialize};

use super::compute::ApplicationParallelismType;

catalog_enum! {
    /// Type tag for an application input or output.
    DataType {
        String => "STRING",
        Integer => "INTEGER",
        Float => "FLOAT",
        Uri => "URI",
        UriCollection => "URI_COLLECTION",
        Stdout => "STDOUT",
        Stderr => "STDERR",
    }
}

/// A named, versioned piece of software.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationModule {
    pub app_module_id: String,
    pub app_module_name: String,
    pub app_module_version: Option<String>,
    pub app_module_description: Option<String>,
}

/// One input of an application interface. Keyed by `name` within the interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDataObjectType {
    pub name: String,
    pub value: Option<String>,
    pub data_type: DataType,
    pub application_argument: Option<String>,
    pub standard_input: bool,
    pub user_friendly_description: Option<String>,
    pub meta_data: Option<String>,
    pub input_order: i32,
    pub is_required: bool,
    pub required_to_added_to_command_line: bool,
    pub data_staged: bool,
    pub storage_resource_id: Option<String>,
    pub is_read_only: bool,
    pub override_filename: Option<String>,
}

/// One output of an application interface. Keyed by `name` within the interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDataObjectType {
    pub name: String,
    pub value: Option<String>,
    pub data_type: DataType,
    pub application_argument: Option<String>,
    pub is_required: bool,
    pub required_to_added_to_command_line: bool,
    pub data_movement: bool,
    pub location: Option<String>,
    pub search_query: Option<String>,
    pub output_streaming: bool,
    pub storage_resource_id: Option<String>,
    pub meta_data: Option<String>,
}

/// The user-facing description of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationInterfaceDescription {
    pub application_interface_id: String,
    pub application_name: String,
    pub application_description: Option<String>,
    /// Module ids, in the order they were supplied.
    pub application_modules: Vec<String>,
    pub application_inputs: Vec<InputDataObjectType>,
    pub application_outputs: Vec<OutputDataObjectType>,
    pub archive_working_directory: bool,
    pub has_optional_file_inputs: bool,
}

/// A shell command with an explicit ordering hint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandObject {
    pub command: String,
    pub command_order: i32,
}

impl CommandObject {
    pub fn new(command: impl Into<String>, command_order: i32) -> Self {
        Self {
            command: command.into(),
            command_order,
        }
    }
}

/// An environment entry applied before running an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetEnvPaths {
    pub name: String,
    pub value: String,
    pub env_path_order: i32,
}

/// Where and how a module runs on one compute host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDeploymentDescription {
    pub app_deployment_id: String,
    pub app_module_id: String,
    pub compute_host_id: String,
    pub executable_path: String,
    pub parallelism: ApplicationParallelismType,
    pub app_deployment_description: Option<String>,
    pub module_load_cmds: Vec<CommandObject>,
    pub lib_prepend_paths: Vec<SetEnvPaths>,
    pub lib_append_paths: Vec<SetEnvPaths>,
    pub set_environment: Vec<SetEnvPaths>,
    pub pre_job_commands: Vec<CommandObject>,
    pub post_job_commands: Vec<CommandObject>,
    pub default_queue_name: Option<String>,
    pub default_node_count: Option<i32>,
    pub default_cpu_count: Option<i32>,
    pub default_walltime: Option<i32>,
    pub editable_by_user: bool,
}
