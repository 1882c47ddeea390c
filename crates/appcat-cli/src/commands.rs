//! Subcommands of the `appcat` binary.

use std::path::PathBuf;

use clap::Subcommand;

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create the database schema and seed the default gateway profile
    Init,

    /// Manage compute resources
    Compute {
        #[command(subcommand)]
        command: ComputeCommand,
    },

    /// Inspect gateway resource profiles
    Profiles {
        #[command(subcommand)]
        command: ProfilesCommand,
    },

    /// Inspect application modules
    Modules {
        #[command(subcommand)]
        command: ModulesCommand,
    },
}

#[derive(Subcommand)]
pub enum ComputeCommand {
    /// List registered compute resources
    List {
        /// Only show resources with this host name
        #[arg(long)]
        host: Option<String>,
    },

    /// Print one compute resource as JSON
    Show {
        /// Compute resource id
        id: String,
    },

    /// Register a compute resource from a JSON file
    Import {
        /// Path to a JSON compute resource description
        file: PathBuf,
    },

    /// Remove a compute resource and everything it owns
    Remove {
        /// Compute resource id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ProfilesCommand {
    /// List gateway resource profiles with their preference counts
    List,
}

#[derive(Subcommand)]
pub enum ModulesCommand {
    /// List the application modules of a gateway
    List {
        /// Gateway id
        #[arg(long)]
        gateway: String,
    },
}
