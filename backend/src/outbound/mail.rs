//! Mail delivery adapters.

use async_trait::async_trait;

use crate::domain::ports::{MailDispatchError, MailMessage, MailSink};

/// Mail sink that writes messages to the structured log instead of a
/// relay. Stands in for a real transport in development and tests; the
/// code lands in the log where an operator can read it.
#[derive(Debug, Default, Clone)]
pub struct LogMailSink;

impl LogMailSink {
    /// Create the sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailSink for LogMailSink {
    async fn send(&self, message: &MailMessage) -> Result<(), MailDispatchError> {
        tracing::info!(
            from = %message.from,
            recipients = ?message.recipients,
            subject = %message.subject,
            body = %message.body,
            "outbound mail"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sink_accepts_every_message() {
        let sink = LogMailSink::new();
        let message = MailMessage {
            subject: "Your confirmation code".to_owned(),
            body: "code body".to_owned(),
            from: "noreply@example.com".to_owned(),
            recipients: vec!["alice@example.com".to_owned()],
        };
        sink.send(&message).await.expect("delivery succeeds");
    }
}
