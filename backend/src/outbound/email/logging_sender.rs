//! Email sender that only logs.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{EmailMessage, EmailSendError, EmailSender};

/// Development sender: logs recipient and subject, never the body, since
/// bodies carry confirmation secrets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSendError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email delivery disabled; message dropped"
        );
        Ok(())
    }
}
