//! Compute resource types.
//!
//! A `ComputeResourceDescription` owns its batch queues, file-system roots and
//! the priority-ordered interface tuples. The submission and data-movement
//! configurations those tuples point at (`SshJobSubmission`,
//! `ScpDataMovement`, ...) live in their own id space and outlive any
//! resource that references them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

catalog_enum! {
    /// Protocol used to submit jobs to a compute resource.
    JobSubmissionProtocol {
        Local => "LOCAL",
        Ssh => "SSH",
        Globus => "GLOBUS",
        Unicore => "UNICORE",
        Cloud => "CLOUD",
        SshFork => "SSH_FORK",
        LocalFork => "LOCAL_FORK",
    }
}

catalog_enum! {
    /// Protocol used to move data to and from a resource.
    DataMovementProtocol {
        Local => "LOCAL",
        Scp => "SCP",
        Sftp => "SFTP",
        GridFtp => "GridFTP",
        UnicoreStorageService => "UNICORE_STORAGE_SERVICE",
    }
}

catalog_enum! {
    /// Authentication scheme for a submission or movement channel.
    SecurityProtocol {
        UsernamePassword => "USERNAME_PASSWORD",
        SshKeys => "SSH_KEYS",
        Gsi => "GSI",
        Kerberos => "KERBEROS",
        Oauth => "OAUTH",
        Local => "LOCAL",
    }
}

catalog_enum! {
    /// Batch system flavour of a resource job manager.
    ResourceJobManagerType {
        Fork => "FORK",
        Pbs => "PBS",
        Slurm => "SLURM",
        Lsf => "LSF",
        Uge => "UGE",
        Cloud => "CLOUD",
        Airavata => "AIRAVATA",
        HtCondor => "HTCONDOR",
    }
}

catalog_enum! {
    /// Operations a job manager exposes as shell commands.
    JobManagerCommand {
        Submission => "SUBMISSION",
        JobMonitoring => "JOB_MONITORING",
        Deletion => "DELETION",
        CheckJob => "CHECK_JOB",
        ShowQueue => "SHOW_QUEUE",
        ShowReservation => "SHOW_RESERVATION",
        ShowStart => "SHOW_START",
        ShowClusterInfo => "SHOW_CLUSTER_INFO",
        ShowNoOfRunningJobs => "SHOW_NO_OF_RUNNING_JOBS",
        ShowNoOfPendingJobs => "SHOW_NO_OF_PENDING_JOBS",
    }
}

catalog_enum! {
    /// How an application is parallelised.
    ApplicationParallelismType {
        Serial => "SERIAL",
        Mpi => "MPI",
        OpenMp => "OPENMP",
        OpenMpMpi => "OPENMP_MPI",
        Ccm => "CCM",
        CrayMpi => "CRAY_MPI",
    }
}

catalog_enum! {
    /// Well-known file-system roots on a compute resource.
    FileSystems {
        Home => "HOME",
        Work => "WORK",
        LocalTmp => "LOCALTMP",
        Scratch => "SCRATCH",
        Archive => "ARCHIVE",
    }
}

catalog_enum! {
    /// How job state is observed after submission.
    MonitorMode {
        PollJobManager => "POLL_JOB_MANAGER",
        CloudJobMonitor => "CLOUD_JOB_MONITOR",
        JobEmailNotificationMonitor => "JOB_EMAIL_NOTIFICATION_MONITOR",
        XsedeAmqpSubscribe => "XSEDE_AMQP_SUBSCRIBE",
        Fork => "FORK",
        Local => "LOCAL",
    }
}

catalog_enum! {
    /// Cloud provider behind a cloud job submission.
    ProviderName {
        Ec2 => "EC2",
        AwsEc2 => "AWSEC2",
        Rackspace => "RACKSPACE",
    }
}

/// A named batch queue. Identified by `(compute resource id, queue_name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchQueue {
    pub queue_name: String,
    pub queue_description: Option<String>,
    pub max_run_time: Option<i32>,
    pub max_nodes: Option<i32>,
    pub max_processors: Option<i32>,
    pub max_jobs_in_queue: Option<i32>,
    pub max_memory: Option<i32>,
    pub cpu_per_node: Option<i32>,
    pub default_node_count: Option<i32>,
    pub default_cpu_count: Option<i32>,
    pub default_walltime: Option<i32>,
    pub queue_specific_macros: Option<String>,
    pub is_default_queue: bool,
}

impl BatchQueue {
    /// Create a queue with only its name set.
    pub fn named(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            ..Self::default()
        }
    }
}

/// Priority-ordered pointer from a resource to a submission config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSubmissionInterface {
    pub job_submission_interface_id: String,
    pub job_submission_protocol: JobSubmissionProtocol,
    pub priority_order: i32,
}

/// Priority-ordered pointer from a resource to a data movement config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataMovementInterface {
    pub data_movement_interface_id: String,
    pub data_movement_protocol: DataMovementProtocol,
    pub priority_order: i32,
}

/// A registered compute host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeResourceDescription {
    /// Empty on add means "generate from `host_name`".
    pub compute_resource_id: String,
    pub host_name: String,
    pub host_aliases: Vec<String>,
    pub ip_addresses: Vec<String>,
    pub resource_description: Option<String>,
    pub enabled: bool,
    pub batch_queues: Vec<BatchQueue>,
    pub file_systems: BTreeMap<FileSystems, String>,
    pub job_submission_interfaces: Vec<JobSubmissionInterface>,
    pub data_movement_interfaces: Vec<DataMovementInterface>,
    pub max_memory_per_node: Option<i32>,
    pub gateway_usage_reporting: bool,
    pub gateway_usage_module_load_command: Option<String>,
    pub gateway_usage_executable: Option<String>,
    pub cpus_per_node: Option<i32>,
    pub default_node_count: Option<i32>,
    pub default_cpu_count: Option<i32>,
    pub default_walltime: Option<i32>,
}

impl ComputeResourceDescription {
    /// Look up an owned queue by name.
    pub fn batch_queue(&self, queue_name: &str) -> Option<&BatchQueue> {
        self.batch_queues
            .iter()
            .find(|q| q.queue_name == queue_name)
    }
}

/// A batch system configuration shared by submission configs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceJobManager {
    pub resource_job_manager_id: String,
    pub resource_job_manager_type: ResourceJobManagerType,
    pub push_monitoring_endpoint: Option<String>,
    pub job_manager_bin_path: Option<String>,
    pub job_manager_commands: BTreeMap<JobManagerCommand, String>,
    pub parallelism_prefix: BTreeMap<ApplicationParallelismType, String>,
}

/// Submission over SSH to a batch system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshJobSubmission {
    pub job_submission_interface_id: String,
    pub security_protocol: SecurityProtocol,
    pub resource_job_manager: ResourceJobManager,
    pub alternative_ssh_host_name: Option<String>,
    pub ssh_port: Option<i32>,
    pub monitor_mode: Option<MonitorMode>,
}

/// Submission on the local host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSubmission {
    pub job_submission_interface_id: String,
    pub security_protocol: SecurityProtocol,
    pub resource_job_manager: ResourceJobManager,
}

/// Submission to a cloud VM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudJobSubmission {
    pub job_submission_interface_id: String,
    pub security_protocol: SecurityProtocol,
    pub node_id: String,
    pub executable_type: String,
    pub provider_name: ProviderName,
    pub user_account_name: String,
}

/// Submission to a UNICORE services endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnicoreJobSubmission {
    pub job_submission_interface_id: String,
    pub security_protocol: SecurityProtocol,
    pub unicore_end_point_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScpDataMovement {
    pub data_movement_interface_id: String,
    pub security_protocol: SecurityProtocol,
    pub alternative_scp_host_name: Option<String>,
    pub ssh_port: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridFtpDataMovement {
    pub data_movement_interface_id: String,
    pub security_protocol: SecurityProtocol,
    pub grid_ftp_end_points: Vec<String>,
}

/// Data staged through a UNICORE storage service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnicoreDataMovement {
    pub data_movement_interface_id: String,
    pub security_protocol: SecurityProtocol,
    pub unicore_end_point_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDataMovement {
    pub data_movement_interface_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_tags_round_trip_through_from_str() {
        for tag in ["SSH", "LOCAL_FORK", "CLOUD"] {
            let protocol: JobSubmissionProtocol = tag.parse().unwrap();
            assert_eq!(protocol.as_str(), tag);
        }
        assert_eq!(
            "GridFTP".parse::<DataMovementProtocol>().unwrap(),
            DataMovementProtocol::GridFtp
        );
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = "TORQUE".parse::<ResourceJobManagerType>().unwrap_err();
        assert_eq!(err.kind, "ResourceJobManagerType");
        assert_eq!(err.value, "TORQUE");
    }

    #[test]
    fn test_file_system_map_serializes_with_tags() {
        let mut resource = ComputeResourceDescription::default();
        resource
            .file_systems
            .insert(FileSystems::Scratch, "/scratch".to_string());

        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["file_systems"]["SCRATCH"], "/scratch");
    }

    #[test]
    fn test_batch_queue_lookup_by_name() {
        let resource = ComputeResourceDescription {
            batch_queues: vec![BatchQueue::named("normal"), BatchQueue::named("debug")],
            ..ComputeResourceDescription::default()
        };

        assert!(resource.batch_queue("debug").is_some());
        assert!(resource.batch_queue("gpu").is_none());
    }
}
