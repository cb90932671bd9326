//! atl CLI - Confluence and Jira from the terminal.
//!
//! Provides commands for:
//! - `confluence`: read, find, list, create and update pages
//! - `jira`: read and add issue comments, read and log work
//!
//! Results are written to stdout as JSON; messages go to stderr.

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfluenceCommand, JiraCommand};
use output::Output;

/// atl - Confluence and Jira client.
#[derive(Parser)]
#[command(name = "atl", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover atl.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Confluence base URL (overrides config).
    #[arg(long, global = true, env = "CONFLUENCE_URL")]
    pub confluence_url: Option<String>,

    /// Jira base URL (overrides config).
    #[arg(long, global = true, env = "JIRA_URL")]
    pub jira_url: Option<String>,

    /// Enable verbose output (request and conversion logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Confluence page commands.
    #[command(subcommand)]
    Confluence(ConfluenceCommand),
    /// Jira comment and worklog commands.
    #[command(subcommand)]
    Jira(JiraCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Confluence(cmd) => cmd.execute(&cli.global, &output),
        Commands::Jira(cmd) => cmd.execute(&cli.global, &output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "atl",
            "confluence",
            "page",
            "12345",
            "--config",
            "/etc/atl.toml",
            "-v",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        assert_eq!(cli.global.config, Some(PathBuf::from("/etc/atl.toml")));
        assert!(matches!(cli.command, Commands::Confluence(_)));
    }

    #[test]
    fn test_jira_comment_args() {
        let cli = Cli::try_parse_from([
            "atl",
            "jira",
            "comment",
            "PROJ-1",
            "Looks good",
            "--visibility",
            "internal",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Jira(_)));
    }

    #[test]
    fn test_missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["atl", "jira"]).is_err());
    }
}
