//! Email sender backed by a transactional email HTTP API.
//!
//! Messages are posted as JSON `{from, to, subject, text}` with a bearer API
//! key. Any non-success status is reported as [`EmailSendError::Rejected`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::EmailAddress;
use crate::domain::ports::{EmailMessage, EmailSendError, EmailSender};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`HttpEmailSender`].
#[derive(Debug, Clone)]
pub struct HttpEmailConfig {
    pub endpoint: String,
    pub api_key: Zeroizing<String>,
    pub from: EmailAddress,
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl<'a> OutgoingEmail<'a> {
    fn new(from: &'a EmailAddress, message: &'a EmailMessage) -> Self {
        Self {
            from: from.as_ref(),
            to: message.to.as_ref(),
            subject: &message.subject,
            text: &message.body,
        }
    }
}

/// reqwest-backed [`EmailSender`].
#[derive(Clone)]
pub struct HttpEmailSender {
    client: reqwest::Client,
    config: HttpEmailConfig,
}

impl HttpEmailSender {
    /// Build a sender with a bounded request timeout.
    ///
    /// # Errors
    /// Returns [`EmailSendError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: HttpEmailConfig) -> Result<Self, EmailSendError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| EmailSendError::transport(err.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSendError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.config.api_key.as_str())
            .json(&OutgoingEmail::new(&self.config.from, message))
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "email API unreachable");
                EmailSendError::transport(err.to_string())
            })?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), to = %message.to, "email API rejected message");
            return Err(EmailSendError::rejected(status.as_u16()));
        }
        debug!(to = %message.to, "email accepted by provider");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_provider_field_names() {
        let from = EmailAddress::new("noreply@ideahub.test").expect("email");
        let message = EmailMessage {
            to: EmailAddress::new("a@x.com").expect("email"),
            subject: "Welcome".to_owned(),
            body: "Hi".to_owned(),
        };
        let json = serde_json::to_value(OutgoingEmail::new(&from, &message)).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "from": "noreply@ideahub.test",
                "to": "a@x.com",
                "subject": "Welcome",
                "text": "Hi",
            })
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let sender = HttpEmailSender::new(HttpEmailConfig {
            endpoint: "http://127.0.0.1:9/send".to_owned(),
            api_key: Zeroizing::new("key".to_owned()),
            from: EmailAddress::new("noreply@ideahub.test").expect("email"),
        })
        .expect("client");
        let message = EmailMessage {
            to: EmailAddress::new("a@x.com").expect("email"),
            subject: "s".to_owned(),
            body: "b".to_owned(),
        };
        assert!(matches!(
            sender.send(&message).await,
            Err(EmailSendError::Transport { .. })
        ));
    }
}
