//! Email sender that keeps every message for later inspection.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{EmailMessage, EmailSendError, EmailSender};

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    /// Mailer whose every send fails with a transport error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<EmailMessage> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(_) => panic!("mailer mutex"),
        }
    }

    /// Value of `name` in the query string of the last link sent.
    pub fn last_link_param(&self, name: &str) -> Option<String> {
        let message = self.sent().pop()?;
        let query = message.body.split_once('?')?.1;
        let query = query.split_whitespace().next()?;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_owned())
        })
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSendError> {
        if self.fail {
            return Err(EmailSendError::transport("mailer offline"));
        }
        match self.sent.lock() {
            Ok(mut sent) => sent.push(message.clone()),
            Err(_) => panic!("mailer mutex"),
        }
        Ok(())
    }
}
