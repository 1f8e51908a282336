//! Error types for the helpdesk engine
//!
//! Primary operations fail with [`HelpdeskError`]. Its variants fall into two
//! groups: request failures that carry an HTTP-style status (validation,
//! authentication, authorization, missing records, version conflicts) and
//! infrastructure failures (storage, configuration, I/O, serialization).
//!
//! Side-effect paths (notification dispatch, email delivery) use the separate
//! [`DispatchError`] so they can never be confused with, or propagated as, a
//! failure of the primary mutation.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, HelpdeskError>;

/// Main error type for helpdesk operations
#[derive(Error, Debug)]
pub enum HelpdeskError {
    /// Missing or malformed required fields
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No actor, or the actor could not be identified
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Role or ownership check failed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Ticket, note, or notification does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Optimistic version check failed repeatedly
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Record store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("{0}")]
    Custom(String),
}

impl HelpdeskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn ticket_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Ticket",
            id: id.to_string(),
        }
    }

    pub fn note_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Note",
            id: id.to_string(),
        }
    }

    pub fn notification_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Notification",
            id: id.to_string(),
        }
    }

    /// HTTP status code carried by this error
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthenticated(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            _ => 500,
        }
    }

    /// Whether retrying the same request may succeed
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Storage(_) | Self::Io(_))
    }

    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Yaml(_))
    }

    /// Message safe to show to an API client or terminal user
    ///
    /// Infrastructure details are withheld; they are logged instead.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Unauthenticated(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg)
            | Self::Config(msg)
            | Self::Custom(msg) => msg.clone(),
            Self::NotFound { kind, .. } => format!("{kind} not found"),
            Self::Storage(_) | Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Template(_) => {
                "Internal server error".to_string()
            },
        }
    }

    /// Hints for recovering from the error, shown by the CLI
    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(_) | Self::Yaml(_) => vec![
                "Run 'helpdesk config show' to inspect the effective configuration".to_string(),
                "Run 'helpdesk config init --force' to regenerate a default config file".to_string(),
            ],
            Self::Io(_) => vec!["Check file permissions and that the path exists".to_string()],
            Self::Conflict(_) => vec!["Reload the ticket and retry the update".to_string()],
            _ => vec![],
        }
    }
}

impl From<config::ConfigError> for HelpdeskError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Failure of a best-effort notification side effect
///
/// Never converted into [`HelpdeskError`]: callers log it and move on.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("failed to persist notification: {0}")]
    Store(String),

    #[error("recipient {0} could not be resolved")]
    RecipientNotFound(String),

    #[error("failed to render email: {0}")]
    Template(String),

    #[error("email delivery failed: {0}")]
    Email(String),

    #[error("email delivery timed out after {0}s")]
    Timeout(u64),
}

impl From<HelpdeskError> for DispatchError {
    fn from(err: HelpdeskError) -> Self {
        Self::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(HelpdeskError::validation("x").status_code(), 400);
        assert_eq!(HelpdeskError::unauthenticated("x").status_code(), 401);
        assert_eq!(HelpdeskError::forbidden("x").status_code(), 403);
        assert_eq!(HelpdeskError::ticket_not_found("abc").status_code(), 404);
        assert_eq!(HelpdeskError::Conflict("x".into()).status_code(), 409);
        assert_eq!(HelpdeskError::storage("disk").status_code(), 500);
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = HelpdeskError::storage("connection refused on 10.0.0.3");
        assert_eq!(err.user_message(), "Internal server error");

        let err = HelpdeskError::note_not_found("n-1");
        assert_eq!(err.user_message(), "Note not found");
        assert_eq!(err.to_string(), "Note not found: n-1");
    }

    #[test]
    fn test_recoverable_and_config_flags() {
        assert!(HelpdeskError::Conflict("stale".into()).is_recoverable());
        assert!(!HelpdeskError::forbidden("no").is_recoverable());
        assert!(HelpdeskError::Config("bad".into()).is_config_error());
        assert!(!HelpdeskError::Config("bad".into()).suggestions().is_empty());
    }

    #[test]
    fn test_dispatch_error_display() {
        assert_eq!(
            DispatchError::Timeout(10).to_string(),
            "email delivery timed out after 10s"
        );
    }
}
