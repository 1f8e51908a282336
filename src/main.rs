//! helpdesk - Support ticket lifecycle and notification service
//!
//! This is the main entry point for the helpdesk CLI application.
//! It parses arguments, sets up logging and dispatches to the command
//! handlers.

use clap::Parser;
use helpdesk::cli::{
    Cli, Commands, OutputFormatter,
    handlers::{handle_config_command, handle_serve},
};
use helpdesk::config::Config;
use helpdesk::error::{HelpdeskError, Result};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let formatter = OutputFormatter::new(cli.json, cli.no_color);

    if let Err(e) = run(cli, &formatter) {
        handle_error(&e, &formatter);
        process::exit(1);
    }
}

/// Run the CLI application with the parsed arguments
///
/// Configuration is loaded once up front so its logging level applies to
/// every command; handlers decide whether a load failure is fatal.
fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    let loaded = Config::load(cli.config.as_deref());
    let level = loaded
        .as_ref()
        .map_or("info", |config| config.logging.level.as_str());
    init_logging(cli.verbose, level);

    match cli.command {
        Commands::Serve { host, port } => handle_serve(loaded?, host, port, formatter),
        Commands::Config { command } => {
            handle_config_command(command, cli.config.as_deref(), loaded, formatter)
        },
    }
}

/// `-v` forces debug; otherwise `RUST_LOG` wins over the configured level
fn init_logging(verbose: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// The operator sees the full error; only API clients get the redacted message
fn handle_error(error: &HelpdeskError, formatter: &OutputFormatter) {
    formatter.error(&error.to_string());

    let suggestions = error.suggestions();
    if !suggestions.is_empty() {
        formatter.info("\nSuggestions:");
        for suggestion in &suggestions {
            formatter.info(&format!("  • {suggestion}"));
        }
    }

    if formatter.is_json() {
        let _ = formatter.json(&serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "suggestions": suggestions,
            "recoverable": error.is_recoverable(),
            "is_config_error": error.is_config_error(),
        }));
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        eprintln!("\nDebug information:");
        eprintln!("{error:?}");
    }
}
