//! Core of the application catalog: the registry of compute and storage
//! resources, application modules, interfaces and deployments, and the
//! gateway, group and user resource profiles that reference them.
//!
//! This crate holds the domain model, the repository ports and the services.
//! Storage adapters live in `appcat-db`.
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod filter;
pub mod ids;
pub mod ports;
pub mod services;
pub mod sync;

// Re-export commonly used types for convenience
pub use config::{CatalogConfig, ConfigError};
pub use filter::{FieldFilter, FilterError, FilterField, FilterTarget, parse_filters};
pub use ports::{CatalogError, Repos, RepositoryError};
pub use services::Catalog;
