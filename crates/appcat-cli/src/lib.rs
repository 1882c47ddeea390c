//! Command-line adapter for the application catalog.
//!
//! `main.rs` parses arguments and calls [`bootstrap`] once; every handler
//! then works through the [`CliContext`] it returns.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliContext, bootstrap};
pub use commands::{Commands, ComputeCommand, ModulesCommand, ProfilesCommand};
pub use error::CliError;
pub use parser::Cli;
