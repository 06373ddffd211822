//! Port for the refresh token ledger.
//!
//! Only SHA-256 digests of refresh tokens are stored. Rows are flagged as
//! expired on rotation or logout and are never deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by refresh token adapters.
    pub enum RefreshTokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "refresh token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "refresh token repository query failed: {message}",
    }
}

/// Ledger row for a freshly issued refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of a compare-and-swap rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The presented token was active, is now expired, and the replacement
    /// was stored in the same transaction.
    Rotated,
    /// No active token matched; nothing changed.
    NoActiveMatch,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), RefreshTokenRepositoryError>;

    /// Expire the active token of `user_id` whose digest is `presented_hash`
    /// and store `replacement`, atomically.
    ///
    /// A token is active when it is not flagged expired and its expiry lies
    /// after `now`. Of two concurrent rotations of the same token at most one
    /// observes [`RotationOutcome::Rotated`].
    async fn rotate(
        &self,
        user_id: &UserId,
        presented_hash: &str,
        now: DateTime<Utc>,
        replacement: &RefreshTokenRecord,
    ) -> Result<RotationOutcome, RefreshTokenRepositoryError>;

    /// Flag every non-expired token of `user_id` as expired, returning how
    /// many rows changed.
    async fn revoke_all(&self, user_id: &UserId) -> Result<u64, RefreshTokenRepositoryError>;
}
