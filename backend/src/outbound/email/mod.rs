//! Outbound email adapters implementing [`EmailSender`].
//!
//! [`LoggingEmailSender`] is used when no email API is configured and only
//! records that a message would have been sent. [`HttpEmailSender`] posts
//! messages to a transactional email HTTP API.
//!
//! [`EmailSender`]: crate::domain::ports::EmailSender

mod http_sender;
mod logging_sender;

pub use http_sender::{HttpEmailConfig, HttpEmailSender};
pub use logging_sender::LoggingEmailSender;
