//! Authentication inputs and outputs: login credentials, the registration
//! password policy and issued token pairs.
//!
//! Handlers build these types from raw payloads before calling a port, so
//! services only ever see validated values.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{DisplayName, EmailAddress, UserValidationError};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    Email(UserValidationError),
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(inner) => inner.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// The password is kept verbatim (no trimming) and wiped on drop.
///
/// # Examples
/// ```
/// use ideahub::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("A@x.com", "Abc12345!").unwrap();
/// assert_eq!(creds.email().as_ref(), "a@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] for a malformed email or empty
    /// password.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(LoginValidationError::Email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;

/// Rules of the registration password policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyError {
    TooShort { min: usize },
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSymbol,
}

impl PasswordPolicyError {
    /// Machine-readable rule identifier.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TooShort { .. } => "password_too_short",
            Self::MissingUppercase => "password_missing_uppercase",
            Self::MissingLowercase => "password_missing_lowercase",
            Self::MissingDigit => "password_missing_digit",
            Self::MissingSymbol => "password_missing_symbol",
        }
    }
}

impl fmt::Display for PasswordPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => write!(f, "password must be at least {min} characters"),
            Self::MissingUppercase => write!(f, "password must contain an uppercase letter"),
            Self::MissingLowercase => write!(f, "password must contain a lowercase letter"),
            Self::MissingDigit => write!(f, "password must contain a digit"),
            Self::MissingSymbol => {
                write!(f, "password must contain a non-alphanumeric character")
            }
        }
    }
}

impl std::error::Error for PasswordPolicyError {}

/// Password that satisfies the registration policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Check `raw` against the policy, reporting every violated rule.
    ///
    /// # Examples
    /// ```
    /// use ideahub::domain::{NewPassword, PasswordPolicyError};
    ///
    /// assert!(NewPassword::new("Abc12345!").is_ok());
    /// let errors = NewPassword::new("abc").unwrap_err();
    /// assert!(errors.contains(&PasswordPolicyError::MissingDigit));
    /// ```
    ///
    /// # Errors
    /// Returns the list of violated rules in a stable order.
    pub fn new(raw: &str) -> Result<Self, Vec<PasswordPolicyError>> {
        let mut violations = Vec::new();
        if raw.chars().count() < PASSWORD_MIN {
            violations.push(PasswordPolicyError::TooShort { min: PASSWORD_MIN });
        }
        if !raw.chars().any(char::is_uppercase) {
            violations.push(PasswordPolicyError::MissingUppercase);
        }
        if !raw.chars().any(char::is_lowercase) {
            violations.push(PasswordPolicyError::MissingLowercase);
        }
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PasswordPolicyError::MissingDigit);
        }
        if !raw.chars().any(|c| !c.is_alphanumeric()) {
            violations.push(PasswordPolicyError::MissingSymbol);
        }
        if violations.is_empty() {
            Ok(Self(Zeroizing::new(raw.to_owned())))
        } else {
            Err(violations)
        }
    }

    /// Plain-text password, for hashing only.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

/// Validation failure for a registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Email or display name rejected.
    User(UserValidationError),
    /// Password policy violations.
    Password(Vec<PasswordPolicyError>),
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(inner) => inner.fmt(f),
            Self::Password(rules) => {
                let joined = rules
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                f.write_str(&joined)
            }
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub password: NewPassword,
}

impl Registration {
    /// Validate raw registration inputs.
    ///
    /// # Errors
    /// Returns the first invalid user field, or every password rule violated.
    pub fn try_from_parts(
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let email = EmailAddress::new(email).map_err(RegistrationValidationError::User)?;
        let display_name =
            DisplayName::new(display_name).map_err(RegistrationValidationError::User)?;
        let password = NewPassword::new(password).map_err(RegistrationValidationError::Password)?;
        Ok(Self {
            email,
            display_name,
            password,
        })
    }
}

/// Access/refresh token pair returned by login and rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_token_expiry: DateTime<Utc>,
}
