//! Catalog domain types.
//!
//! These types represent the pure catalog model, independent of any
//! storage concerns. Every aggregate derives `PartialEq` so callers and
//! tests compare values structurally.
//!
//! # Structure
//!
//! - `compute` - Compute resources, batch queues, submission and movement configs
//! - `application` - Application modules, interfaces and deployments
//! - `storage` - Storage resources
//! - `gateway_profile` - Gateway resource profiles and their preferences
//! - `group_profile` - Group resource profiles, policies and reservations
//! - `user_profile` - Per-user resource profiles
//! - `gateway_groups` - Gateway group id records
//! - `keys` - Composite keys

use thiserror::Error;

pub use application::{
    ApplicationDeploymentDescription, ApplicationInterfaceDescription, ApplicationModule,
    CommandObject, DataType, InputDataObjectType, OutputDataObjectType, SetEnvPaths,
};
pub use compute::{
    ApplicationParallelismType, BatchQueue, CloudJobSubmission, ComputeResourceDescription,
    DataMovementInterface, DataMovementProtocol, FileSystems, GridFtpDataMovement,
    JobManagerCommand, JobSubmissionInterface, JobSubmissionProtocol, LocalDataMovement,
    LocalSubmission, MonitorMode, ProviderName, ResourceJobManager, ResourceJobManagerType,
    ScpDataMovement, SecurityProtocol, SshJobSubmission, UnicoreDataMovement,
    UnicoreJobSubmission,
};
pub use gateway_groups::GatewayGroups;
pub use keys::{ResourceChildKey, UserProfileKey};
pub use gateway_profile::{ComputeResourcePreference, GatewayResourceProfile, StoragePreference};
pub use group_profile::{
    BatchQueueResourcePolicy, ComputeResourcePolicy, ComputeResourceReservation,
    GroupComputeResourcePreference, GroupResourceProfile,
};
pub use storage::StorageResourceDescription;
pub use user_profile::{UserComputeResourcePreference, UserResourceProfile, UserStoragePreference};

/// A stored enum tag did not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected text.
    pub value: String,
}

/// Declares a closed enum whose wire and storage form is a fixed tag.
///
/// The first variant is the `Default`.
macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(#[$fmeta:meta])* $first:ident => $ftag:literal
            $(, $(#[$vmeta:meta])* $variant:ident => $tag:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(#[$fmeta])*
            #[default]
            #[serde(rename = $ftag)]
            $first,
            $(
                $(#[$vmeta])*
                #[serde(rename = $tag)]
                $variant,
            )*
        }

        impl $name {
            /// The tag used on the wire and in storage.
            pub const fn as_str(self) -> &'static str {
                match self {
                    Self::$first => $ftag,
                    $(Self::$variant => $tag,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $ftag => Ok(Self::$first),
                    $($tag => Ok(Self::$variant),)*
                    _ => Err($crate::domain::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

pub mod application;
pub mod compute;
pub mod gateway_groups;
pub mod gateway_profile;
pub mod group_profile;
pub mod keys;
pub mod storage;
pub mod user_profile;
