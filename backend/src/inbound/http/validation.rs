//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `InvalidRequest` error whose `details` name the
//! offending field and a machine-readable code; the envelope renderer lifts
//! `details.messages` into the response `errors` array.

use std::str::FromStr;

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use serde_json::json;
use tracing::debug;

use crate::domain::{
    Error, IdeaStatus, LoginValidationError, ProjectStatus, RegistrationValidationError, Title,
    TitleError, UserValidationError,
};

use super::error::DETAIL_MESSAGES;

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, message: String) -> Error {
    Error::invalid_request(message.clone()).with_details(json!({
        "field": field,
        "code": code,
        DETAIL_MESSAGES: [message],
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(field, "missing_field", format!("{field} is required"))
}

pub(crate) fn map_user_validation_error(err: &UserValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn map_login_validation_error(err: &LoginValidationError) -> Error {
    match err {
        LoginValidationError::Email(inner) => map_user_validation_error(inner),
        LoginValidationError::EmptyPassword => field_error(
            "password",
            "empty_password",
            "password must not be empty".to_owned(),
        ),
    }
}

pub(crate) fn map_registration_error(err: &RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::User(inner) => map_user_validation_error(inner),
        RegistrationValidationError::Password(rules) => {
            let messages: Vec<String> = rules.iter().map(ToString::to_string).collect();
            let codes: Vec<&str> = rules.iter().map(|rule| rule.code()).collect();
            Error::invalid_request("password does not meet the password policy").with_details(
                json!({
                    "field": "password",
                    "code": "password_policy",
                    "rules": codes,
                    DETAIL_MESSAGES: messages,
                }),
            )
        }
    }
}

/// Validate a required title-like field.
pub(crate) fn parse_title(raw: &str, field: FieldName) -> Result<Title, Error> {
    Title::new(raw).map_err(|err| title_error(field, err))
}

/// Validate an optional title-like field of a partial update.
pub(crate) fn parse_optional_title(
    raw: Option<&str>,
    field: FieldName,
) -> Result<Option<Title>, Error> {
    raw.map(|value| parse_title(value, field)).transpose()
}

fn title_error(field: FieldName, err: TitleError) -> Error {
    let field = field.as_str();
    field_error(field, err.code(), format!("{field} {err}"))
}

/// Case-insensitive `Open`/`Closed`.
pub(crate) fn parse_idea_status(raw: &str) -> Result<IdeaStatus, Error> {
    IdeaStatus::from_str(raw).map_err(|_| {
        field_error(
            "status",
            "invalid_status",
            "Invalid status value. Allowed values are: Open, Closed".to_owned(),
        )
    })
}

/// Case-insensitive project status.
pub(crate) fn parse_project_status(raw: &str) -> Result<ProjectStatus, Error> {
    ProjectStatus::from_str(raw).map_err(|_| {
        field_error(
            "status",
            "invalid_status",
            "Invalid status value. Allowed values are: Planning, Active, Completed, Shelved, Cancelled"
                .to_owned(),
        )
    })
}

/// Render malformed JSON bodies as 400 envelopes.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected request body");
    Error::invalid_request("Request body is not valid JSON for this endpoint")
        .with_details(json!({
            "code": "invalid_body",
            DETAIL_MESSAGES: [err.to_string()],
        }))
        .into()
}

/// Render malformed or missing query parameters as 400 envelopes.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected query string");
    Error::invalid_request("Query parameters are missing or invalid")
        .with_details(json!({
            "code": "invalid_query",
            DETAIL_MESSAGES: [err.to_string()],
        }))
        .into()
}

/// Render non-numeric path ids as 400 envelopes rather than 404s.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected path segment");
    Error::invalid_request("Path parameters are invalid")
        .with_details(json!({
            "code": "invalid_path",
            DETAIL_MESSAGES: [err.to_string()],
        }))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, PasswordPolicyError};
    use rstest::rstest;

    #[rstest]
    fn missing_fields_name_the_field() {
        let err = missing_field_error(FieldName::new("groupId"));
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "groupId is required");
        let details = err.details().expect("details");
        assert_eq!(details.get("field"), Some(&json!("groupId")));
    }

    #[rstest]
    #[case("open", IdeaStatus::Open)]
    #[case("CLOSED", IdeaStatus::Closed)]
    fn idea_status_is_case_insensitive(#[case] raw: &str, #[case] expected: IdeaStatus) {
        assert_eq!(parse_idea_status(raw).expect("valid status"), expected);
    }

    #[rstest]
    #[case("archived")]
    #[case("")]
    fn unknown_idea_status_is_rejected(#[case] raw: &str) {
        let err = parse_idea_status(raw).expect_err("invalid status");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn project_status_lists_allowed_values() {
        let err = parse_project_status("paused").expect_err("invalid status");
        assert!(err.message().contains("Shelved"));
        assert_eq!(
            parse_project_status("active").expect("valid"),
            ProjectStatus::Active
        );
    }

    #[rstest]
    fn blank_titles_are_rejected() {
        let err = parse_title("   ", FieldName::new("title")).expect_err("blank title");
        assert_eq!(err.message(), "title must not be empty");
    }

    #[rstest]
    fn absent_optional_title_is_none() {
        assert_eq!(
            parse_optional_title(None, FieldName::new("name")).expect("none is fine"),
            None
        );
    }

    #[rstest]
    fn password_rules_become_messages() {
        let err = map_registration_error(&RegistrationValidationError::Password(vec![
            PasswordPolicyError::MissingDigit,
            PasswordPolicyError::MissingSymbol,
        ]));
        let details = err.details().expect("details");
        assert_eq!(
            details.get(DETAIL_MESSAGES).and_then(|v| v.as_array()).map(Vec::len),
            Some(2)
        );
        assert_eq!(
            details.get("rules"),
            Some(&json!(["password_missing_digit", "password_missing_symbol"]))
        );
    }

    #[rstest]
    fn login_email_errors_reuse_user_field_codes() {
        let err = map_login_validation_error(&LoginValidationError::Email(
            UserValidationError::InvalidEmail,
        ));
        let details = err.details().expect("details");
        assert_eq!(details.get("field"), Some(&json!("email")));
        assert_eq!(details.get("code"), Some(&json!("invalid_email")));
    }
}
