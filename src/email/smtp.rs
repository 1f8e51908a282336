use super::{EmailMessage, EmailSender};
use crate::config::SmtpConfig;
use crate::error::DispatchError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP relay sender using Lettre
///
/// A transport is built per message; the blocking send runs on the
/// blocking thread pool.
#[derive(Clone)]
pub struct SmtpEmailSender {
    host: String,
    port: u16,
    credentials: Credentials,
    from: String,
}

impl SmtpEmailSender {
    #[must_use]
    pub fn new(config: &SmtpConfig, from: &str) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            credentials: Credentials::new(config.username.clone(), config.password.clone()),
            from: from.to_string(),
        }
    }

    fn build_transport(&self) -> Result<SmtpTransport, DispatchError> {
        Ok(SmtpTransport::relay(&self.host)
            .map_err(|e| DispatchError::Email(format!("SMTP relay error: {e}")))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| DispatchError::Email(format!("Invalid from address: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| DispatchError::Email(format!("Invalid to address: {e}")))?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| DispatchError::Email(format!("Failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| DispatchError::Email(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| DispatchError::Email(format!("Email task failed: {e}")))?
        .map(|_| ())
    }
}
