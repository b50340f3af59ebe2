//! Email delivery for transactional messages.
//!
//! Workflows depend on the [`Mailer`] port; [`EmailService`] implements it
//! over SMTP with `lettre`.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;
use crate::error::AppError;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

/// Outbound mail port.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends an HTML message to a single recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or delivered.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError>;
}

/// SMTP-backed mailer.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("smtp_host", &self.config.smtp_host)
            .field("smtp_port", &self.config.smtp_port)
            .field("from_email", &self.config.from_email)
            .finish_non_exhaustive()
    }
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(self.config.smtp_port);

        let builder = if self.config.smtp_username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ))
        };

        Ok(builder.build())
    }

    fn build_message(&self, to: &str, subject: &str, html_body: &str) -> Result<Message, EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        let message = self.build_message(to, subject, html_body)?;
        self.transport()?
            .send(message)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        tracing::debug!(to, subject, "email delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let service = EmailService::new(EmailConfig::default());
        let result = service.build_message("not-an-address", "Hi", "<p>x</p>");
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[test]
    fn test_build_message_accepts_valid_recipient() {
        let service = EmailService::new(EmailConfig::default());
        assert!(service.build_message("alice@example.com", "Hi", "<p>x</p>").is_ok());
    }

    #[test]
    fn test_email_error_maps_to_external_service() {
        let err: AppError = EmailError::SendError("relay down".into()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "EXTERNAL_SERVICE_ERROR");
    }
}
