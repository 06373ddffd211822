//! OpenAPI schema definitions that have no Rust counterpart.
//!
//! Failure responses are rendered from [`crate::domain::Error`] by the
//! `ResponseError` impl, so the document needs a standalone description of
//! the failure envelope.

use utoipa::ToSchema;

/// Envelope returned for every failed request.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorEnvelopeSchema {
    /// Always `false`.
    #[schema(example = false)]
    success: bool,
    /// Human-readable failure summary.
    #[schema(example = "Group not found")]
    message: String,
    /// Always `null`.
    data: Option<serde_json::Value>,
    /// Individual failure messages, at least one.
    #[schema(example = json!(["Group not found"]))]
    errors: Vec<String>,
}

/// Envelope returned by endpoints that carry only a message.
#[derive(ToSchema)]
#[schema(as = MessageEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MessageEnvelopeSchema {
    #[schema(example = true)]
    success: bool,
    #[schema(example = "Logged out successfully")]
    message: String,
    data: Option<serde_json::Value>,
    errors: Vec<String>,
}
