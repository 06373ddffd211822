//! PostgreSQL-backed `MembershipRepository`.
//!
//! Deciding a request only touches rows still marked `pending`; approving one
//! inserts the membership in the same transaction, so the unique `user_id`
//! constraint on `user_groups` rolls the decision back when the applicant has
//! joined another group in the meantime.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{MembershipRepository, MembershipRepositoryError};
use crate::domain::{
    GroupId, MembershipRequest, MembershipRequestId, MembershipStatus, NewMembershipRequest,
    PendingRequestView, UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_invalid_row, unique_violation,
};
use super::models::{MembershipRequestRow, NewMembershipRequestRow, NewMembershipRow};
use super::pool::{DbPool, PoolError};
use super::schema::{group_membership_requests, user_groups, users};

#[derive(Clone)]
pub struct DieselMembershipRepository {
    pool: DbPool,
}

impl DieselMembershipRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MembershipRepositoryError {
    map_basic_pool_error(error, MembershipRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MembershipRepositoryError {
    match unique_violation(&error) {
        Some("user_groups_user_id_key" | "user_groups_pkey") => {
            MembershipRepositoryError::already_member()
        }
        Some("group_membership_requests_pending_key") => {
            MembershipRepositoryError::duplicate_pending()
        }
        _ => map_basic_diesel_error(
            error,
            MembershipRepositoryError::query,
            MembershipRepositoryError::connection,
        ),
    }
}

fn into_request(
    row: MembershipRequestRow,
) -> Result<MembershipRequest, MembershipRepositoryError> {
    MembershipRequest::try_from(row)
        .map_err(|err| map_invalid_row(err, MembershipRepositoryError::query))
}

type PendingRow = (i64, Uuid, String, String, DateTime<Utc>);

fn pending_view(row: PendingRow) -> PendingRequestView {
    let (request_id, user_id, display_name, email, requested_at) = row;
    PendingRequestView {
        request_id: MembershipRequestId::new(request_id),
        request_user_id: UserId::from_uuid(user_id),
        display_name,
        email,
        requested_at,
    }
}

#[async_trait]
impl MembershipRepository for DieselMembershipRepository {
    async fn group_of(&self, user: &UserId) -> Result<Option<GroupId>, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let group: Option<i64> = user_groups::table
            .filter(user_groups::user_id.eq(user.as_uuid()))
            .select(user_groups::group_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(group.map(GroupId::new))
    }

    async fn pending_request(
        &self,
        user: &UserId,
        group: GroupId,
    ) -> Result<Option<MembershipRequest>, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        group_membership_requests::table
            .filter(group_membership_requests::user_id.eq(user.as_uuid()))
            .filter(group_membership_requests::group_id.eq(group.get()))
            .filter(group_membership_requests::status.eq(MembershipStatus::Pending.as_str()))
            .select(MembershipRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(into_request)
            .transpose()
    }

    async fn insert_request(
        &self,
        request: &NewMembershipRequest,
    ) -> Result<MembershipRequest, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(group_membership_requests::table)
            .values(NewMembershipRequestRow {
                user_id: *request.user_id.as_uuid(),
                group_id: request.group_id.get(),
                status: MembershipStatus::Pending.as_str(),
                requested_at: request.requested_at,
            })
            .returning(MembershipRequestRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_request(row)
    }

    async fn pending_requests(
        &self,
        group: GroupId,
    ) -> Result<Vec<PendingRequestView>, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PendingRow> = group_membership_requests::table
            .inner_join(users::table)
            .filter(group_membership_requests::group_id.eq(group.get()))
            .filter(group_membership_requests::status.eq(MembershipStatus::Pending.as_str()))
            .order_by(group_membership_requests::requested_at.asc())
            .select((
                group_membership_requests::id,
                users::id,
                users::display_name,
                users::email,
                group_membership_requests::requested_at,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(pending_view).collect())
    }

    async fn record_decision(
        &self,
        request: &MembershipRequest,
    ) -> Result<bool, MembershipRepositoryError> {
        let id = request.id.get();
        let status = request.status.as_str();
        let decided_at = request.decided_at;
        let membership = (request.status == MembershipStatus::Approved).then(|| NewMembershipRow {
            user_id: *request.user_id.as_uuid(),
            group_id: request.group_id.get(),
            joined_at: decided_at.unwrap_or(request.requested_at),
        });
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let decided = diesel::update(
                    group_membership_requests::table
                        .filter(group_membership_requests::id.eq(id))
                        .filter(
                            group_membership_requests::status
                                .eq(MembershipStatus::Pending.as_str()),
                        ),
                )
                .set((
                    group_membership_requests::status.eq(status),
                    group_membership_requests::decided_at.eq(decided_at),
                ))
                .execute(conn)
                .await?;
                if decided == 0 {
                    return Ok(false);
                }
                if let Some(membership) = membership {
                    diesel::insert_into(user_groups::table)
                        .values(membership)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn remove_membership(
        &self,
        user: &UserId,
        group: GroupId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            user_groups::table
                .filter(user_groups::user_id.eq(user.as_uuid()))
                .filter(user_groups::group_id.eq(group.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_timestamp;

    #[test]
    fn pending_rows_become_views() {
        let user = Uuid::nil();
        let view = pending_view((
            12,
            user,
            "Grace".to_owned(),
            "grace@example.com".to_owned(),
            fixture_timestamp(),
        ));
        assert_eq!(view.request_id, MembershipRequestId::new(12));
        assert_eq!(view.request_user_id, UserId::from_uuid(user));
        assert_eq!(view.display_name, "Grace");
    }

    #[test]
    fn unrelated_errors_fall_back_to_query() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, MembershipRepositoryError::Query { .. }));
    }
}
