//! CLI entry point.
//!
//! Parses arguments, bootstraps the catalog once and dispatches to the
//! handlers. Failures exit with the code of the `CliError`.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use appcat_cli::{
    Cli, CliError, Commands, ComputeCommand, ModulesCommand, ProfilesCommand, bootstrap, handlers,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading APPCAT_* variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("APPCAT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Err(err) = run(cli.database, command).await {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
    Ok(())
}

async fn run(database: Option<String>, command: Commands) -> Result<(), CliError> {
    let ctx = bootstrap(database).await?;

    match command {
        Commands::Init => handlers::init::execute(&ctx).await,
        Commands::Compute { command } => match command {
            ComputeCommand::List { host } => handlers::compute::list(&ctx, host.as_deref()).await,
            ComputeCommand::Show { id } => handlers::compute::show(&ctx, &id).await,
            ComputeCommand::Import { file } => {
                handlers::compute::import(&ctx, &file).await.map(|_| ())
            }
            ComputeCommand::Remove { id } => handlers::compute::remove(&ctx, &id).await,
        },
        Commands::Profiles { command } => match command {
            ProfilesCommand::List => handlers::profiles::list(&ctx).await,
        },
        Commands::Modules { command } => match command {
            ModulesCommand::List { gateway } => handlers::modules::list(&ctx, &gateway).await,
        },
    }
}
