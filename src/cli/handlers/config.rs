use crate::cli::{ConfigCommands, OutputFormatter};
use crate::config::Config;
use crate::error::{HelpdeskError, Result};
use std::path::{Path, PathBuf};

/// Handle the config subcommands
///
/// `loaded` is the result of loading the configuration before dispatch; only
/// `show` and `validate` need it, so a broken file never blocks `init`.
pub fn handle_config_command(
    command: ConfigCommands,
    explicit: Option<&Path>,
    loaded: Result<Config>,
    formatter: &OutputFormatter,
) -> Result<()> {
    match command {
        ConfigCommands::Show => handle_show(loaded?, formatter),
        ConfigCommands::Init { path, force } => {
            let target = path
                .or_else(|| explicit.map(Path::to_path_buf))
                .or_else(Config::default_path)
                .ok_or_else(|| {
                    HelpdeskError::Config("could not determine a config directory".to_string())
                })?;
            handle_init(&target, force, formatter)
        },
        ConfigCommands::Path => handle_path(explicit, formatter),
        ConfigCommands::Validate => {
            let config = loaded?;
            if formatter.is_json() {
                formatter.json(&serde_json::json!({ "status": "ok", "users": config.directory.users.len() }))
            } else {
                formatter.success("Configuration is valid");
                Ok(())
            }
        },
    }
}

fn handle_show(config: Config, formatter: &OutputFormatter) -> Result<()> {
    if formatter.is_json() {
        return formatter.json(&config);
    }
    let yaml = serde_yaml::to_string(&config)?;
    formatter.info(yaml.trim_end());
    Ok(())
}

fn handle_init(path: &Path, force: bool, formatter: &OutputFormatter) -> Result<()> {
    if path.exists() && !force {
        return Err(HelpdeskError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save(path)?;
    tracing::debug!(path = %path.display(), "wrote default configuration");

    if formatter.is_json() {
        formatter.json(&serde_json::json!({
            "status": "created",
            "path": path.display().to_string(),
        }))
    } else {
        formatter.success(&format!("Wrote default configuration to {}", path.display()));
        Ok(())
    }
}

fn handle_path(explicit: Option<&Path>, formatter: &OutputFormatter) -> Result<()> {
    let active: Option<PathBuf> = explicit.map(Path::to_path_buf).or_else(Config::discover);
    let default = Config::default_path();

    if formatter.is_json() {
        return formatter.json(&serde_json::json!({
            "active": active.as_ref().map(|p| p.display().to_string()),
            "default": default.as_ref().map(|p| p.display().to_string()),
        }));
    }

    match active {
        Some(path) => formatter.info(&path.display().to_string()),
        None => {
            formatter.info("No configuration file found; using built-in defaults");
            if let Some(default) = default {
                formatter.info(&format!("Default location: {}", default.display()));
            }
        },
    }
    Ok(())
}
