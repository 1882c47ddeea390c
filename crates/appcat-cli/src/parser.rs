//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the application catalog.
#[derive(Parser)]
#[command(name = "appcat")]
#[command(about = "Inspect and edit an application catalog database")]
#[command(version)]
pub struct Cli {
    /// Catalog database URL or file path
    #[arg(long = "database", global = true, env = "APPCAT_DATABASE_URL")]
    pub database: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ComputeCommand;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["appcat", "--verbose", "--database", "/tmp/cat.db", "init"]);
        assert!(cli.verbose);
        assert_eq!(cli.database.as_deref(), Some("/tmp/cat.db"));
        assert!(matches!(cli.command, Some(Commands::Init)));
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from(["appcat", "compute", "show", "host_1", "--database", "x.db"]);
        assert_eq!(cli.database.as_deref(), Some("x.db"));
        match cli.command {
            Some(Commands::Compute {
                command: ComputeCommand::Show { id },
            }) => assert_eq!(id, "host_1"),
            _ => panic!("expected compute show"),
        }
    }

    #[test]
    fn test_compute_list_host_filter() {
        let cli = Cli::parse_from(["appcat", "compute", "list", "--host", "comet.example.org"]);
        match cli.command {
            Some(Commands::Compute {
                command: ComputeCommand::List { host },
            }) => assert_eq!(host.as_deref(), Some("comet.example.org")),
            _ => panic!("expected compute list"),
        }
    }

    #[test]
    fn test_modules_list_requires_gateway() {
        assert!(Cli::try_parse_from(["appcat", "modules", "list"]).is_err());
    }
}
