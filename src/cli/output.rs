//! Terminal output formatting

use crate::error::Result;
use colored::Colorize;
use serde::Serialize;

/// Writes human-readable or JSON output depending on global flags
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    json: bool,
}

impl OutputFormatter {
    #[must_use]
    pub fn new(json: bool, no_color: bool) -> Self {
        if no_color || std::env::var_os("NO_COLOR").is_some() {
            colored::control::set_override(false);
        }
        Self { json }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{} {message}", "✓".green().bold());
        }
    }

    pub fn info(&self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.json {
            eprintln!("{} {message}", "warning:".yellow().bold());
        }
    }

    /// Errors go to stderr in both modes
    pub fn error(&self, message: &str) {
        eprintln!("{} {message}", "error:".red().bold());
    }

    pub fn json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
