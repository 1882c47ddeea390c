//! Compute resource command handlers.

use std::collections::BTreeMap;
use std::path::Path;

use appcat_core::FilterField;
use appcat_core::domain::ComputeResourceDescription;
use tracing::info;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_optional, print_separator, truncate_string};

/// List compute resources, optionally only those on `host`.
pub async fn list(ctx: &CliContext, host: Option<&str>) -> Result<(), CliError> {
    let compute = ctx.catalog().compute();
    let resources = match host {
        Some(host) => {
            let key = FilterField::HostName.key().to_string();
            let filters = BTreeMap::from([(key, host.to_string())]);
            compute.get_compute_resource_list(&filters).await?
        }
        None => compute.get_all_compute_resources().await?,
    };

    if resources.is_empty() {
        println!("No compute resources found.");
        println!("Use 'appcat compute import <file.json>' to register one.");
        return Ok(());
    }

    println!(
        "{:<40} {:<30} {:<8} {:<7} Description",
        "ID", "Host", "Queues", "Enabled"
    );
    print_separator(100);
    for resource in &resources {
        println!(
            "{:<40} {:<30} {:<8} {:<7} {}",
            truncate_string(&resource.compute_resource_id, 39),
            truncate_string(&resource.host_name, 29),
            resource.batch_queues.len(),
            if resource.enabled { "yes" } else { "no" },
            format_optional(resource.resource_description.as_ref(), "--"),
        );
    }
    println!("\n{} compute resource(s)", resources.len());
    Ok(())
}

/// Print one resource as pretty JSON. Absence is an error.
pub async fn show(ctx: &CliContext, id: &str) -> Result<(), CliError> {
    let resource = ctx
        .catalog()
        .compute()
        .get_compute_resource(id)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("compute resource {id}")))?;
    println!("{}", serde_json::to_string_pretty(&resource)?);
    Ok(())
}

/// Register the resource described in a JSON file. Returns the assigned id.
pub async fn import(ctx: &CliContext, file: &Path) -> Result<String, CliError> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", file.display())))?;
    let resource: ComputeResourceDescription = serde_json::from_str(&raw)?;

    let id = ctx.catalog().compute().add_compute_resource(resource).await?;
    info!(%id, file = %file.display(), "Imported compute resource");
    println!("Imported compute resource {id}");
    Ok(id)
}

pub async fn remove(ctx: &CliContext, id: &str) -> Result<(), CliError> {
    ctx.catalog().compute().remove_compute_resource(id).await?;
    println!("Removed compute resource {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::bootstrap;

    async fn context(dir: &tempfile::TempDir) -> CliContext {
        let path = dir.path().join("catalog.db");
        bootstrap(Some(path.display().to_string())).await.unwrap()
    }

    #[tokio::test]
    async fn test_import_then_show_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir).await;
        let file = dir.path().join("comet.json");
        std::fs::write(
            &file,
            r#"{"host_name": "comet.example.org", "enabled": true,
                "batch_queues": [{"queue_name": "normal"}]}"#,
        )
        .unwrap();

        let id = import(&ctx, &file).await.unwrap();
        assert!(id.starts_with("comet_example_org_"));

        show(&ctx, &id).await.unwrap();
        list(&ctx, Some("comet.example.org")).await.unwrap();

        remove(&ctx, &id).await.unwrap();
        let err = show(&ctx, &id).await.unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir).await;
        let file = dir.path().join("broken.json");
        std::fs::write(&file, "{ not json").unwrap();

        let err = import(&ctx, &file).await.unwrap_err();
        assert!(matches!(err, CliError::Arguments(_)));
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir).await;

        let err = import(&ctx, &dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir).await;

        assert!(matches!(remove(&ctx, "ghost").await, Err(CliError::NotFound(_))));
    }
}
