//! Command-line interface
//!
//! The binary has two jobs: run the HTTP API and manage its configuration
//! file. Ticket operations go through the API.

pub mod handlers;
pub mod output;

pub use output::OutputFormatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI parser for the `helpdesk` binary
#[derive(Debug, Parser)]
#[command(name = "helpdesk", version, about = "Helpdesk ticket lifecycle and notification service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./helpdesk.yaml, then the platform config dir)
    #[arg(short, long, global = true, env = "HELPDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overriding server.host
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Where to write the file (defaults to the platform config dir)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print where the configuration is read from
    Path,

    /// Load and validate the configuration without starting anything
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["helpdesk", "serve", "--port", "8080", "--json", "-v"])
            .expect("cli should parse");

        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: Some(8080),
                host: None
            }
        ));
    }

    #[test]
    fn test_config_init_flags() {
        let cli = Cli::try_parse_from(["helpdesk", "config", "init", "--force", "--path", "x.yaml"])
            .expect("cli should parse");

        match cli.command {
            Commands::Config {
                command: ConfigCommands::Init { path, force },
            } => {
                assert!(force);
                assert_eq!(path, Some(PathBuf::from("x.yaml")));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
