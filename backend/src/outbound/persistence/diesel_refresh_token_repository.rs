//! PostgreSQL-backed `RefreshTokenRepository`.
//!
//! Rotation is a compare-and-swap: the presented token is expired with a
//! conditional `UPDATE`, and the replacement is inserted in the same
//! transaction only when exactly one row flipped. A concurrent rotation of
//! the same token sees zero rows and reports `NoActiveMatch`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::UserId;
use crate::domain::ports::{
    RefreshTokenRecord, RefreshTokenRepository, RefreshTokenRepositoryError, RotationOutcome,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewRefreshTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::refresh_tokens;

#[derive(Clone)]
pub struct DieselRefreshTokenRepository {
    pool: DbPool,
}

impl DieselRefreshTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RefreshTokenRepositoryError {
    map_basic_pool_error(error, RefreshTokenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RefreshTokenRepositoryError {
    map_basic_diesel_error(
        error,
        RefreshTokenRepositoryError::query,
        RefreshTokenRepositoryError::connection,
    )
}

fn new_row(record: &RefreshTokenRecord) -> NewRefreshTokenRow<'_> {
    NewRefreshTokenRow {
        id: record.id,
        user_id: *record.user_id.as_uuid(),
        token_hash: &record.token_hash,
        expires_at: record.expires_at,
        created_at: record.created_at,
    }
}

#[async_trait]
impl RefreshTokenRepository for DieselRefreshTokenRepository {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), RefreshTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(refresh_tokens::table)
            .values(new_row(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn rotate(
        &self,
        user_id: &UserId,
        presented_hash: &str,
        now: DateTime<Utc>,
        replacement: &RefreshTokenRecord,
    ) -> Result<RotationOutcome, RefreshTokenRepositoryError> {
        let user = *user_id.as_uuid();
        let replacement_row = new_row(replacement);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let flipped = diesel::update(
                    refresh_tokens::table
                        .filter(refresh_tokens::token_hash.eq(presented_hash))
                        .filter(refresh_tokens::user_id.eq(user))
                        .filter(refresh_tokens::expired.eq(false))
                        .filter(refresh_tokens::expires_at.gt(now)),
                )
                .set(refresh_tokens::expired.eq(true))
                .execute(conn)
                .await?;

                if flipped != 1 {
                    return Ok(RotationOutcome::NoActiveMatch);
                }

                diesel::insert_into(refresh_tokens::table)
                    .values(&replacement_row)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(RotationOutcome::Rotated)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn revoke_all(&self, user_id: &UserId) -> Result<u64, RefreshTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let revoked = diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::user_id.eq(user_id.as_uuid()))
                .filter(refresh_tokens::expired.eq(false)),
        )
        .set(refresh_tokens::expired.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(revoked).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_timestamp;
    use chrono::TimeDelta;
    use uuid::Uuid;

    #[test]
    fn new_row_borrows_the_digest() {
        let record = RefreshTokenRecord {
            id: Uuid::nil(),
            user_id: UserId::random(),
            token_hash: "ab".repeat(32),
            expires_at: fixture_timestamp() + TimeDelta::days(7),
            created_at: fixture_timestamp(),
        };
        let row = new_row(&record);
        assert_eq!(row.token_hash, record.token_hash);
        assert_eq!(row.user_id, *record.user_id.as_uuid());
    }

    #[test]
    fn pool_failures_are_connection_errors() {
        let err = map_pool_error(PoolError::checkout("pool exhausted"));
        assert_eq!(err, RefreshTokenRepositoryError::connection("pool exhausted"));
    }
}
