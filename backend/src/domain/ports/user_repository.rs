//! Port for credential storage.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EmailAddress, Role, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The email address already belongs to another account.
        DuplicateEmail => "email address is already registered",
    }
}

/// Stored user accounts. Lookups never return soft-deleted accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Emails are compared in their normalised (lowercase) form.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Insert a new account together with its roles.
    async fn insert(&self, user: &UserAccount) -> Result<(), UserRepositoryError>;

    /// Physically remove an account that never completed registration.
    async fn remove(&self, id: &UserId) -> Result<(), UserRepositoryError>;

    /// Replace the stored confirmation token digest.
    async fn set_confirmation_token(
        &self,
        id: &UserId,
        token_hash: Option<String>,
    ) -> Result<(), UserRepositoryError>;

    /// Flag the email as confirmed and clear the confirmation digest.
    async fn mark_email_confirmed(&self, id: &UserId) -> Result<(), UserRepositoryError>;

    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserRepositoryError>;

    /// Add `role` to the account; granting a held role is a no-op.
    async fn grant_role(&self, id: &UserId, role: Role) -> Result<(), UserRepositoryError>;
}
