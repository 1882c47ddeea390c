//! Gateway profile command handlers.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

/// List gateway profiles with their preference counts.
pub async fn list(ctx: &CliContext) -> Result<(), CliError> {
    let profiles = ctx
        .catalog()
        .gateway_profiles()
        .get_all_gateway_profiles()
        .await?;

    println!("{:<30} {:<10} {:<10}", "Gateway", "Compute", "Storage");
    print_separator(52);
    for profile in &profiles {
        println!(
            "{:<30} {:<10} {:<10}",
            truncate_string(&profile.gateway_id, 29),
            profile.compute_resource_preferences.len(),
            profile.storage_preferences.len(),
        );
    }
    Ok(())
}
