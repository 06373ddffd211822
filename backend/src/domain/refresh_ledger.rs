//! Refresh token ledger.
//!
//! Raw refresh tokens only ever leave the process; the ledger stores their
//! SHA-256 digests. Rotation is a single compare-and-swap in the repository
//! so a token can be exchanged at most once.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::ports::{RefreshTokenRecord, RefreshTokenRepository, RotationOutcome};
use super::secrets::{digest_secret, generate_refresh_token};
use super::{Error, UserId};

/// A raw refresh token handed to the client, and when it stops working.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub raw: Zeroizing<String>,
    pub expires_at: DateTime<Utc>,
}

pub struct RefreshTokenLedger<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
}

impl<R> RefreshTokenLedger<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, lifetime: Duration) -> Self {
        Self {
            repo,
            clock,
            lifetime,
        }
    }

    fn mint(&self, user_id: &UserId) -> (IssuedRefreshToken, RefreshTokenRecord) {
        let now = self.clock.utc();
        let raw = generate_refresh_token();
        let expires_at = now + self.lifetime;
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id: *user_id,
            token_hash: digest_secret(&raw),
            expires_at,
            created_at: now,
        };
        (IssuedRefreshToken { raw, expires_at }, record)
    }
}

impl<R> RefreshTokenLedger<R>
where
    R: RefreshTokenRepository,
{
    /// Generate and store a fresh token for `user_id`.
    pub async fn issue(&self, user_id: &UserId) -> Result<IssuedRefreshToken, Error> {
        let (issued, record) = self.mint(user_id);
        self.repo.insert(&record).await?;
        Ok(issued)
    }

    /// Exchange `presented` for a new token.
    ///
    /// Returns `None` when `presented` is not an active token of `user_id`;
    /// callers must not tell the client which check failed.
    pub async fn rotate(
        &self,
        user_id: &UserId,
        presented: &str,
    ) -> Result<Option<IssuedRefreshToken>, Error> {
        let presented_hash = digest_secret(presented);
        let (issued, replacement) = self.mint(user_id);
        let outcome = self
            .repo
            .rotate(user_id, &presented_hash, replacement.created_at, &replacement)
            .await?;
        match outcome {
            RotationOutcome::Rotated => Ok(Some(issued)),
            RotationOutcome::NoActiveMatch => {
                debug!(user_id = %user_id, "refresh token not active");
                Ok(None)
            }
        }
    }

    /// Expire every active token of `user_id`. Idempotent.
    pub async fn revoke_all(&self, user_id: &UserId) -> Result<u64, Error> {
        let revoked = self.repo.revoke_all(user_id).await?;
        info!(user_id = %user_id, revoked, "refresh tokens revoked");
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockRefreshTokenRepository;
    use crate::test_support::{ManualClock, fixture_timestamp};

    fn ledger(repo: MockRefreshTokenRepository) -> RefreshTokenLedger<MockRefreshTokenRepository> {
        let clock = Arc::new(ManualClock::new(fixture_timestamp()));
        RefreshTokenLedger::new(Arc::new(repo), clock, Duration::days(7))
    }

    #[tokio::test]
    async fn issue_stores_digest_not_raw_token() {
        let mut repo = MockRefreshTokenRepository::new();
        let user = UserId::random();
        repo.expect_insert()
            .withf(move |record| {
                record.user_id == user
                    && record.expires_at == fixture_timestamp() + Duration::days(7)
                    && record.token_hash.len() == 44
            })
            .times(1)
            .return_once(|_| Ok(()));

        let issued = ledger(repo).issue(&user).await.expect("issued");
        assert_ne!(issued.raw.as_str(), "");
        assert_eq!(issued.expires_at, fixture_timestamp() + Duration::days(7));
    }

    #[tokio::test]
    async fn rotate_hashes_presented_token() {
        let mut repo = MockRefreshTokenRepository::new();
        let user = UserId::random();
        let expected = digest_secret("presented");
        repo.expect_rotate()
            .withf(move |id, hash, now, replacement| {
                *id == user
                    && hash == expected
                    && *now == fixture_timestamp()
                    && replacement.token_hash != expected
            })
            .times(1)
            .return_once(|_, _, _, _| Ok(RotationOutcome::Rotated));

        let rotated = ledger(repo)
            .rotate(&user, "presented")
            .await
            .expect("rotation succeeds");
        assert!(rotated.is_some());
    }

    #[tokio::test]
    async fn rotate_reports_missing_match_as_none() {
        let mut repo = MockRefreshTokenRepository::new();
        repo.expect_rotate()
            .times(1)
            .return_once(|_, _, _, _| Ok(RotationOutcome::NoActiveMatch));

        let rotated = ledger(repo)
            .rotate(&UserId::random(), "stale")
            .await
            .expect("no store failure");
        assert!(rotated.is_none());
    }

    #[tokio::test]
    async fn revoke_all_is_idempotent() {
        let mut repo = MockRefreshTokenRepository::new();
        repo.expect_revoke_all().times(2).returning(|_| Ok(0));
        let ledger = ledger(repo);
        let user = UserId::random();
        assert_eq!(ledger.revoke_all(&user).await.expect("first"), 0);
        assert_eq!(ledger.revoke_all(&user).await.expect("second"), 0);
    }
}
