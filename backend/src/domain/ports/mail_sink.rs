//! Driven port for outbound mail delivery.

use async_trait::async_trait;

/// A single outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Sender address.
    pub from: String,
    /// Recipient addresses.
    pub recipients: Vec<String>,
}

/// Delivery failures raised by mail adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailDispatchError {
    /// The transport could not deliver the message.
    #[error("mail dispatch failure: {message}")]
    Dispatch {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl MailDispatchError {
    /// Helper for dispatch failures.
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }
}

/// Delivery port for confirmation mail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSink: Send + Sync {
    /// Deliver a message, or report why delivery failed.
    async fn send(&self, message: &MailMessage) -> Result<(), MailDispatchError>;
}
