//! Layered configuration
//!
//! Values are resolved in order: built-in defaults, then a YAML file, then
//! `HELPDESK__SECTION__KEY` environment variables. The file is the explicit
//! `--config` path when given, otherwise `./helpdesk.yaml`, otherwise
//! `helpdesk.yaml` in the platform config directory.

use crate::core::{DEFAULT_DEPARTMENT, DEFAULT_SUBJECT_MAX_LENGTH, UserProfile};
use crate::error::{HelpdeskError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "helpdesk.yaml";
const ENV_PREFIX: &str = "HELPDESK";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tickets: TicketConfig,
    pub email: EmailConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| HelpdeskError::Config(format!("invalid server address: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketConfig {
    pub subject_max_length: usize,
    pub default_department: String,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            subject_max_length: DEFAULT_SUBJECT_MAX_LENGTH,
            default_department: DEFAULT_DEPARTMENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// When false, notifications are recorded in-app only
    pub enabled: bool,
    pub from: String,
    /// Base URL of the web client, used for "view ticket" links
    pub client_url: String,
    pub timeout_secs: u64,
    pub smtp: Option<SmtpConfig>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from: "noreply@helpdesk.com".to_string(),
            client_url: "http://localhost:3000".to_string(),
            timeout_secs: 10,
            smtp: None,
        }
    }
}

impl EmailConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn ticket_link(&self, ticket: impl std::fmt::Display) -> String {
        format!("{}/tickets/{ticket}", self.client_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

const fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub page_size: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Seed profiles for the bundled user directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub users: Vec<UserProfile>,
}

impl Config {
    /// Load configuration, failing if an explicit path does not exist
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) if !path.exists() => {
                return Err(HelpdeskError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            },
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };

        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(file) = &file {
            tracing::debug!(path = %file.display(), "loading configuration file");
            builder = builder.add_source(
                config::File::from(file.as_path()).format(config::FileFormat::Yaml),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// First existing config file among the working directory and the platform dir
    #[must_use]
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        Self::default_path().filter(|path| path.exists())
    }

    /// Platform-specific location of the config file
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "helpdesk", "helpdesk")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(HelpdeskError::Config("server.port must not be 0".into()));
        }
        if self.email.from.trim().is_empty() {
            return Err(HelpdeskError::Config("email.from must not be empty".into()));
        }
        if self.email.timeout_secs == 0 {
            return Err(HelpdeskError::Config(
                "email.timeout_secs must be at least 1".into(),
            ));
        }
        if self.tickets.subject_max_length == 0 {
            return Err(HelpdeskError::Config(
                "tickets.subject_max_length must be at least 1".into(),
            ));
        }
        if self.notifications.page_size == 0 {
            return Err(HelpdeskError::Config(
                "notifications.page_size must be at least 1".into(),
            ));
        }
        if let Some(user) = self
            .directory
            .users
            .iter()
            .find(|u| !crate::email::is_valid_address(&u.email))
        {
            return Err(HelpdeskError::Config(format!(
                "directory user '{}' has an invalid email address",
                user.name
            )));
        }
        Ok(())
    }

    /// Write the configuration as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
