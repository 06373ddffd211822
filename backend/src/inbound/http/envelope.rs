//! Uniform response envelope.
//!
//! Every response body, success or failure, has the same shape so clients
//! can branch on `success` alone:
//!
//! ```json
//! {"success": true, "message": "Idea created", "data": {...}, "errors": []}
//! ```

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response wrapper shared by all endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    /// `true` for 2xx responses.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Payload; `null` on failure and for message-only responses.
    pub data: Option<T>,
    /// Error messages; empty on success.
    pub errors: Vec<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
        }
    }
}

impl Envelope<()> {
    /// Successful envelope without a payload.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: Vec::new(),
        }
    }

    /// Failed envelope; `errors` always carries at least the message.
    pub fn failure(message: impl Into<String>, mut errors: Vec<String>) -> Self {
        let message = message.into();
        if errors.is_empty() {
            errors.push(message.clone());
        }
        Self {
            success: false,
            message,
            data: None,
            errors,
        }
    }
}

/// `200 OK` with a data-carrying envelope.
pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::ok(message, data))
}

/// `200 OK` with a message-only envelope.
pub fn ok_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::message_only(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn success_envelope_has_empty_errors() {
        let value = serde_json::to_value(Envelope::ok("done", json!({"id": 1})))
            .expect("serialise envelope");
        assert_eq!(
            value,
            json!({"success": true, "message": "done", "data": {"id": 1}, "errors": []})
        );
    }

    #[test]
    fn failure_envelope_repeats_message_when_no_errors_given() {
        let value = serde_json::to_value(Envelope::failure("Group not found", Vec::new()))
            .expect("serialise envelope");
        assert_eq!(value.get("data"), Some(&Value::Null));
        assert_eq!(value.get("errors"), Some(&json!(["Group not found"])));
    }

    #[test]
    fn failure_envelope_keeps_explicit_errors() {
        let envelope = Envelope::failure(
            "password does not meet policy",
            vec!["password must contain a digit".to_owned()],
        );
        assert_eq!(envelope.errors, vec!["password must contain a digit"]);
        assert!(!envelope.success);
    }
}
