//! Outbound email collaborator
//!
//! Transport is external to the helpdesk core. [`LogEmailSender`] writes each
//! message to the tracing log and is the default; `SmtpEmailSender` relays
//! over SMTP when the `smtp` feature is enabled.

#[cfg(feature = "smtp")]
mod smtp;

#[cfg(feature = "smtp")]
pub use smtp::SmtpEmailSender;

use crate::config::EmailConfig;
use crate::error::DispatchError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static ADDRESS: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"));

/// Loose syntactic check of a recipient address
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS.as_ref().is_ok_and(|re| re.is_match(address))
}

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivery of a single email
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError>;
}

/// Sender that only logs
#[derive(Debug, Default, Clone)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            bytes = message.html.len(),
            "email delivered to log sink"
        );
        Ok(())
    }
}

/// Pick the sender for a configuration
///
/// SMTP settings are honoured only when built with the `smtp` feature.
#[must_use]
pub fn sender_from_config(config: &EmailConfig) -> Arc<dyn EmailSender> {
    #[cfg(feature = "smtp")]
    if let Some(smtp) = &config.smtp {
        return Arc::new(SmtpEmailSender::new(smtp, &config.from));
    }

    if config.smtp.is_some() {
        tracing::warn!("smtp settings present but the smtp feature is disabled, logging emails");
    }
    Arc::new(LogEmailSender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let message = EmailMessage {
            to: "ada@example.com".into(),
            subject: "Ticket Assigned".into(),
            html: "<p>hi</p>".into(),
        };
        assert!(LogEmailSender.send(&message).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_sender_reports_failure() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(DispatchError::Email("connection refused".into())));

        let message = EmailMessage {
            to: "x@example.com".into(),
            subject: "s".into(),
            html: String::new(),
        };
        let err = mock.send(&message).await.unwrap_err();
        assert_eq!(err.to_string(), "email delivery failed: connection refused");
    }

    #[test]
    fn test_address_check() {
        assert!(is_valid_address("ada@example.com"));
        assert!(!is_valid_address("ada"));
        assert!(!is_valid_address("ada @example.com"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn test_default_config_uses_log_sender() {
        let _sender = sender_from_config(&EmailConfig::default());
    }
}
