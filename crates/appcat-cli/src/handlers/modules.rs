//! Application module command handlers.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_optional, print_separator, truncate_string};

pub async fn list(ctx: &CliContext, gateway_id: &str) -> Result<(), CliError> {
    let modules = ctx
        .catalog()
        .applications()
        .get_all_application_modules(gateway_id)
        .await?;

    if modules.is_empty() {
        println!("No application modules registered for gateway {gateway_id}.");
        return Ok(());
    }

    println!("{:<40} {:<25} Version", "ID", "Name");
    print_separator(80);
    for module in &modules {
        println!(
            "{:<40} {:<25} {}",
            truncate_string(&module.app_module_id, 39),
            truncate_string(&module.app_module_name, 24),
            format_optional(module.app_module_version.as_ref(), "--"),
        );
    }
    Ok(())
}
