//! PostgreSQL-backed `GroupRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Nullable, Text, Timestamptz};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{GroupRepository, GroupRepositoryError};
use crate::domain::{
    Group, GroupDetails, GroupId, GroupOverview, NewGroup, Role, UserId, UserSummary,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_invalid_row, unique_violation,
};
use super::models::{
    GroupRow, GroupUpdate, NewGroupRow, NewMembershipRow, UserRoleRow, UserSummaryRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{groups, user_groups, user_roles, users};

type ActiveGroups = diesel::dsl::Filter<groups::table, diesel::dsl::Eq<groups::is_deleted, bool>>;

/// Groups that have not been soft-deleted.
pub(crate) fn active() -> ActiveGroups {
    groups::table.filter(groups::is_deleted.eq(false))
}

const OVERVIEW_SQL: &str = r#"
SELECT g.id, g.name, g.description, g.is_active, g.created_at, g.created_by,
       u.display_name AS creator_name,
       u.email AS creator_email,
       EXISTS (
           SELECT 1 FROM user_groups m WHERE m.group_id = g.id AND m.user_id = $1
       ) AS is_member,
       EXISTS (
           SELECT 1 FROM group_membership_requests r
           WHERE r.group_id = g.id AND r.user_id = $1 AND r.status = 'pending'
       ) AS has_pending_request,
       (SELECT COUNT(*) FROM user_groups m WHERE m.group_id = g.id) AS member_count,
       (SELECT COUNT(*) FROM ideas i WHERE i.group_id = g.id AND i.is_deleted = FALSE)
           AS idea_count
FROM groups g
LEFT JOIN users u ON u.id = g.created_by
WHERE g.is_active = TRUE AND g.is_deleted = FALSE
ORDER BY g.created_at DESC, g.id DESC
"#;

#[derive(Debug, QueryableByName)]
struct OverviewRow {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    description: String,
    #[diesel(sql_type = Bool)]
    is_active: bool,
    #[diesel(sql_type = Timestamptz)]
    created_at: chrono::DateTime<chrono::Utc>,
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    created_by: Uuid,
    #[diesel(sql_type = Nullable<Text>)]
    creator_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    creator_email: Option<String>,
    #[diesel(sql_type = Bool)]
    is_member: bool,
    #[diesel(sql_type = Bool)]
    has_pending_request: bool,
    #[diesel(sql_type = BigInt)]
    member_count: i64,
    #[diesel(sql_type = BigInt)]
    idea_count: i64,
}

impl From<OverviewRow> for GroupOverview {
    fn from(row: OverviewRow) -> Self {
        let created_by_user_id = UserId::from_uuid(row.created_by);
        let created_by = row
            .creator_name
            .zip(row.creator_email)
            .map(|(display_name, email)| UserSummary {
                user_id: created_by_user_id,
                display_name,
                email,
            });
        Self {
            id: GroupId::new(row.id),
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            created_by_user_id,
            created_by,
            is_member: row.is_member,
            has_pending_request: row.has_pending_request,
            member_count: row.member_count,
            idea_count: row.idea_count,
        }
    }
}

#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_members(
        conn: &mut AsyncPgConnection,
        id: GroupId,
    ) -> Result<Vec<UserSummary>, GroupRepositoryError> {
        let rows: Vec<UserSummaryRow> = user_groups::table
            .inner_join(users::table)
            .filter(user_groups::group_id.eq(id.get()))
            .order_by(user_groups::joined_at.asc())
            .select(UserSummaryRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(UserSummary::from).collect())
    }
}

fn map_pool_error(error: PoolError) -> GroupRepositoryError {
    map_basic_pool_error(error, GroupRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> GroupRepositoryError {
    map_basic_diesel_error(
        error,
        GroupRepositoryError::query,
        GroupRepositoryError::connection,
    )
}

fn into_group(row: GroupRow) -> Result<Group, GroupRepositoryError> {
    Group::try_from(row).map_err(|err| map_invalid_row(err, GroupRepositoryError::query))
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn create_with_founder(&self, group: &NewGroup) -> Result<Group, GroupRepositoryError> {
        let founder = *group.created_by.as_uuid();
        let new_row = NewGroupRow {
            name: group.name.as_ref(),
            description: &group.description,
            created_by: founder,
            created_at: group.created_at,
        };
        let joined_at = group.created_at;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let row: GroupRow = diesel::insert_into(groups::table)
                        .values(&new_row)
                        .returning(GroupRow::as_returning())
                        .get_result(conn)
                        .await?;
                    diesel::insert_into(user_groups::table)
                        .values(NewMembershipRow {
                            user_id: founder,
                            group_id: row.id,
                            joined_at,
                        })
                        .execute(conn)
                        .await?;
                    diesel::insert_into(user_roles::table)
                        .values(UserRoleRow {
                            user_id: founder,
                            role: Role::GroupAdmin.as_str().to_owned(),
                        })
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match unique_violation(&err) {
                Some("user_groups_user_id_key" | "user_groups_pkey") => {
                    GroupRepositoryError::founder_already_member()
                }
                _ => map_diesel_error(err),
            })?;
        into_group(row)
    }

    async fn find(&self, id: GroupId) -> Result<Option<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        active()
            .filter(groups::id.eq(id.get()))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(into_group)
            .transpose()
    }

    async fn list_overviews(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<GroupOverview>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OverviewRow> = sql_query(OVERVIEW_SQL)
            .bind::<diesel::sql_types::Uuid, _>(viewer.as_uuid())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(GroupOverview::from).collect())
    }

    async fn details(&self, id: GroupId) -> Result<Option<GroupDetails>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = active()
            .filter(groups::id.eq(id.get()))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let created_by: Option<UserSummaryRow> = users::table
            .filter(users::id.eq(row.created_by))
            .select(UserSummaryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let members = Self::load_members(&mut conn, id).await?;
        Ok(Some(GroupDetails {
            id,
            name: row.name,
            description: row.description,
            created_by: created_by.map(UserSummary::from),
            created_at: row.created_at,
            members,
        }))
    }

    async fn members(&self, id: GroupId) -> Result<Vec<UserSummary>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        Self::load_members(&mut conn, id).await
    }

    async fn save(&self, group: &Group) -> Result<(), GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(groups::table.filter(groups::id.eq(group.id.get())))
            .set(GroupUpdate::from(group))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn archive(&self, group: &Group) -> Result<(), GroupRepositoryError> {
        let id = group.id.get();
        let update = GroupUpdate::from(group);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::update(groups::table.filter(groups::id.eq(id)))
                    .set(&update)
                    .execute(conn)
                    .await?;
                diesel::delete(user_groups::table.filter(user_groups::group_id.eq(id)))
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_timestamp;

    fn overview_row(creator_name: Option<&str>) -> OverviewRow {
        OverviewRow {
            id: 4,
            name: "Platform".to_owned(),
            description: String::new(),
            is_active: true,
            created_at: fixture_timestamp(),
            created_by: Uuid::nil(),
            creator_name: creator_name.map(str::to_owned),
            creator_email: creator_name.map(|_| "lead@example.com".to_owned()),
            is_member: true,
            has_pending_request: false,
            member_count: 3,
            idea_count: 9,
        }
    }

    #[test]
    fn overview_nests_the_creator() {
        let overview = GroupOverview::from(overview_row(Some("Lead")));
        let creator = overview.created_by.expect("creator present");
        assert_eq!(creator.display_name, "Lead");
        assert_eq!(creator.user_id, overview.created_by_user_id);
        assert_eq!(overview.member_count, 3);
    }

    #[test]
    fn overview_tolerates_missing_creator() {
        let overview = GroupOverview::from(overview_row(None));
        assert!(overview.created_by.is_none());
    }
}
