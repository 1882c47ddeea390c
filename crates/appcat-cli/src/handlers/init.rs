//! Init command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Report the ready database.
///
/// Schema creation and seeding already happened in `bootstrap`, so this
/// only confirms what was set up.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let gateway = &ctx.config().default_gateway_id;
    let seeded = ctx
        .catalog()
        .gateway_profiles()
        .is_gateway_resource_profile_exists(gateway)
        .await?;

    println!("Catalog database ready: {}", ctx.config().database_url);
    if seeded {
        println!("Default gateway profile: {gateway}");
    }
    Ok(())
}
