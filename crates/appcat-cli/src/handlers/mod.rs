//! Command handlers that delegate to the `Catalog`.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn <command>(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - They call catalog services and format the result for the terminal.
//!
//! Handlers never touch the pool or repositories directly.

pub mod compute;
pub mod init;
pub mod modules;
pub mod profiles;
