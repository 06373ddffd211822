//! Port for outbound transactional email.
use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Failures reported by email adapters.
    pub enum EmailSendError {
        /// The provider could not be reached.
        Transport { message: String } => "email transport failed: {message}",
        /// The provider refused the message.
        Rejected { status: u16 } => "email provider rejected the message with status {status}",
    }
}

/// A plain-text message for a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSendError>;
}
