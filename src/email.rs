//! Outbound delivery of relayed submissions using lettre

use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    transport::smtp::{authentication::Credentials, response::Category},
};

use crate::config::EmailConfig;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("delivery task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DeliveryError {
    /// Short description of the failure that is safe to return to clients.
    pub fn category(&self) -> &'static str {
        match self {
            DeliveryError::Smtp(e) if e.is_timeout() => "timed out",
            DeliveryError::Smtp(e)
                if e.status()
                    .is_some_and(|code| code.category == Category::Unspecified3) =>
            {
                "authentication failed"
            }
            DeliveryError::Smtp(e) if e.is_permanent() || e.is_transient() => "message rejected",
            DeliveryError::Smtp(_) => "connection failed",
            DeliveryError::Task(_) => "internal error",
        }
    }
}

/// Hands a finished message to a mail relay.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn deliver(&self, message: Message) -> Result<(), DeliveryError>;
}

/// Authenticated SMTP relay reached over STARTTLS.
///
/// Every delivery opens its own connection; nothing is reused between
/// requests.
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Self {
        tracing::info!(
            smtp_server = %config.smtp_server,
            smtp_port = config.smtp_port,
            from = %config.sender_email,
            "SMTP mailer configured with STARTTLS and authentication"
        );

        Self {
            host: config.smtp_server.clone(),
            port: config.smtp_port,
            credentials: Credentials::new(
                config.sender_email.clone(),
                config.sender_password.clone(),
            ),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(skip_all, fields(smtp_server = %self.host, smtp_port = self.port))]
    async fn deliver(&self, message: Message) -> Result<(), DeliveryError> {
        let transport = SmtpTransport::starttls_relay(&self.host)?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build();

        let response = tokio::task::spawn_blocking(move || transport.send(&message)).await??;

        tracing::debug!(code = %response.code(), "SMTP relay accepted message");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_relay_is_a_connection_failure() {
        let mailer = SmtpMailer::new(&EmailConfig {
            sender_email: "sender@example.com".to_string(),
            sender_password: "password".to_string(),
            receiver_email: "inbox@example.com".to_string(),
            smtp_server: "127.0.0.1".to_string(),
            smtp_port: 1,
        });

        let message = Message::builder()
            .from("sender@example.com".parse().unwrap())
            .to("inbox@example.com".parse().unwrap())
            .subject("test")
            .body(String::from("test"))
            .unwrap();

        let err = mailer.deliver(message).await.unwrap_err();
        assert_eq!(err.category(), "connection failed");
    }
}
