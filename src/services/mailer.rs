//! Outbound email seam.
//!
//! Only the logging implementation ships; an SMTP transport would implement
//! `Mailer` and be chosen in `app::build_state`.
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

impl MailMessage {
    pub fn new(
        recipients: Vec<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            recipients,
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        if message.recipients.is_empty() {
            return Err(MailError::Transport("no recipients".into()));
        }
        info!(
            from = %self.from,
            to = ?message.recipients,
            subject = %message.subject,
            body = %message.html_body,
            "outgoing mail"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_requires_recipients() {
        let mailer = LogMailer::new("no-reply@bookly.local");
        assert!(
            mailer
                .send(MailMessage::new(vec!["a@b.c".into()], "hi", "<p>hi</p>"))
                .await
                .is_ok()
        );
        assert!(matches!(
            mailer.send(MailMessage::new(vec![], "hi", "")).await,
            Err(MailError::Transport(_))
        ));
    }
}
