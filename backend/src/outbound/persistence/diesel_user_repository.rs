//! PostgreSQL-backed `UserRepository`.
//!
//! Accounts live in `users`; their roles in `user_roles`. Inserting an
//! account writes both in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, Role, UserAccount, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_invalid_row, unique_violation,
};
use super::models::{NewUserRow, UserRoleRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{user_roles, users};

type ActiveUsers = diesel::dsl::Filter<users::table, diesel::dsl::Eq<users::is_deleted, bool>>;

/// Users that have not been soft-deleted.
pub(crate) fn active() -> ActiveUsers {
    users::table.filter(users::is_deleted.eq(false))
}

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn hydrate(
        conn: &mut AsyncPgConnection,
        row: Option<UserRow>,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let roles: Vec<String> = user_roles::table
            .filter(user_roles::user_id.eq(row.id))
            .select(user_roles::role)
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        row.into_account(&roles)
            .map(Some)
            .map_err(|err| map_invalid_row(err, UserRepositoryError::query))
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = active()
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Self::hydrate(&mut conn, row).await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = active()
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Self::hydrate(&mut conn, row).await
    }

    async fn insert(&self, user: &UserAccount) -> Result<(), UserRepositoryError> {
        let new_row = NewUserRow::from(user);
        let role_rows: Vec<UserRoleRow> = user
            .roles
            .iter()
            .map(|role| UserRoleRow {
                user_id: *user.id.as_uuid(),
                role: role.as_str().to_owned(),
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&new_row)
                    .execute(conn)
                    .await?;
                if !role_rows.is_empty() {
                    diesel::insert_into(user_roles::table)
                        .values(&role_rows)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| match unique_violation(&err) {
            Some("users_email_key") => UserRepositoryError::duplicate_email(),
            _ => map_diesel_error(err),
        })
    }

    async fn remove(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_confirmation_token(
        &self,
        id: &UserId,
        token_hash: Option<String>,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::confirmation_token_hash.eq(token_hash))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn mark_email_confirmed(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::email_confirmed.eq(true),
                users::confirmation_token_hash.eq(None::<String>),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::last_login_at.eq(Some(at)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn grant_role(&self, id: &UserId, role: Role) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(user_roles::table)
            .values(UserRoleRow {
                user_id: *id.as_uuid(),
                role: role.as_str().to_owned(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, UserRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn missing_rows_map_to_query() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }
}
