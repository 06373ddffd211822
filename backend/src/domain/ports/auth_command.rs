//! Driving port for registration, login and token lifecycle.
use async_trait::async_trait;

use crate::domain::{
    AuthTokens, EmailAddress, Error, LoginCredentials, Registration, UserId, UserSummary,
};

/// Result of presenting a confirmation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed,
    AlreadyConfirmed,
}

/// Successful login: the account and its fresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: UserSummary,
    pub tokens: AuthTokens,
}

/// Expired access token plus refresh token presented for rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Create an account and send its confirmation email.
    ///
    /// # Errors
    /// `Conflict` when the email is taken; `InternalError` when confirmation
    /// is required and the email could not be sent.
    async fn register(&self, registration: Registration) -> Result<UserSummary, Error>;

    /// Check a confirmation token issued to `user_id`.
    async fn confirm_email(&self, user_id: UserId, token: String)
    -> Result<ConfirmationOutcome, Error>;

    /// Issue and email a fresh confirmation token.
    async fn resend_confirmation(&self, email: EmailAddress) -> Result<(), Error>;

    /// Verify credentials and mint a token pair.
    ///
    /// # Errors
    /// `Unauthorized` for unknown accounts, wrong passwords and, when
    /// required, unconfirmed emails.
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error>;

    /// Rotate a refresh token. Every rejection reason yields the same
    /// `Unauthorized` error.
    async fn refresh(&self, request: RefreshRequest) -> Result<AuthTokens, Error>;

    /// Revoke every active refresh token held by `user_id`.
    async fn logout(&self, user_id: UserId) -> Result<(), Error>;
}
