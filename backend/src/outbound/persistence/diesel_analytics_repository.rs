//! PostgreSQL-backed `AnalyticsRepository`.
//!
//! All aggregates are plain SQL. Soft-deleted ideas, votes, projects and
//! groups never contribute to a count.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text, Timestamptz};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AnalyticsRepository, AnalyticsRepositoryError};
use crate::domain::{
    ContributorCount, DashboardStats, GroupEngagement, GroupId, IdeaId, IdeaStatistics,
    IdeaStatus, IdeaVoteCount, PersonalStats, PromotedIdea, RecentIdea, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};

const MOST_VOTED_SQL: &str = r#"
SELECT i.id AS idea_id, i.title,
       COUNT(v.id) AS vote_count
FROM ideas i
LEFT JOIN votes v ON v.idea_id = i.id AND v.is_deleted = FALSE
WHERE i.is_deleted = FALSE
GROUP BY i.id, i.title
ORDER BY vote_count DESC, i.id ASC
LIMIT $1
"#;

const TOP_CONTRIBUTORS_SQL: &str = r#"
SELECT u.id AS user_id, u.display_name, COUNT(i.id) AS idea_count
FROM ideas i
JOIN users u ON u.id = i.author_id
WHERE i.is_deleted = FALSE
GROUP BY u.id, u.display_name
ORDER BY idea_count DESC, u.display_name ASC
LIMIT $1
"#;

const PROMOTED_SQL: &str = r#"
SELECT i.id AS idea_id, i.title, COALESCE(g.name, '') AS group_name
FROM ideas i
LEFT JOIN groups g ON g.id = i.group_id AND g.is_deleted = FALSE
WHERE i.is_deleted = FALSE AND i.is_promoted_to_project = TRUE
ORDER BY i.created_at DESC, i.id DESC
LIMIT $1
"#;

const IDEA_STATISTICS_SQL: &str = r#"
SELECT COUNT(*) AS total,
       COUNT(*) FILTER (WHERE status = 'Open') AS open,
       COUNT(*) FILTER (WHERE status = 'Closed') AS closed,
       COUNT(*) FILTER (WHERE is_promoted_to_project) AS promoted
FROM ideas
WHERE is_deleted = FALSE
"#;

const GROUP_ENGAGEMENT_SQL: &str = r#"
SELECT e.group_id, e.name, e.idea_count, e.vote_count
FROM (
    SELECT g.id AS group_id, g.name,
           (SELECT COUNT(*) FROM ideas i WHERE i.group_id = g.id AND i.is_deleted = FALSE)
               AS idea_count,
           (SELECT COUNT(*) FROM votes v
            JOIN ideas i ON i.id = v.idea_id
            WHERE i.group_id = g.id AND i.is_deleted = FALSE AND v.is_deleted = FALSE)
               AS vote_count
    FROM groups g
    WHERE g.is_active = TRUE AND g.is_deleted = FALSE
) e
ORDER BY e.idea_count + e.vote_count DESC, e.group_id ASC
LIMIT $1
"#;

const PERSONAL_STATS_SQL: &str = r#"
SELECT
    (SELECT COUNT(*) FROM ideas WHERE author_id = $1 AND is_deleted = FALSE) AS ideas_created,
    (SELECT COUNT(*) FROM votes WHERE user_id = $1 AND is_deleted = FALSE) AS votes_cast,
    (SELECT COUNT(*) FROM projects
     WHERE is_deleted = FALSE AND (created_by = $1 OR overseen_by = $1)) AS projects_involved
"#;

const DASHBOARD_SQL: &str = r#"
SELECT COUNT(*) AS total_ideas,
       COUNT(*) FILTER (WHERE status = 'Open') AS open_ideas,
       COUNT(*) FILTER (WHERE status = 'Closed') AS closed_ideas,
       COUNT(*) FILTER (WHERE is_promoted_to_project) AS promoted_ideas,
       (SELECT COUNT(*) FROM user_groups WHERE user_id = $1) AS total_groups
FROM ideas
WHERE author_id = $1 AND is_deleted = FALSE
"#;

const RECENT_ACTIVITY_SQL: &str = r#"
SELECT i.id AS idea_id, i.title, i.status, i.created_at,
       i.group_id, COALESCE(g.name, '') AS group_name
FROM ideas i
LEFT JOIN groups g ON g.id = i.group_id AND g.is_deleted = FALSE
WHERE i.author_id = $1 AND i.is_deleted = FALSE
ORDER BY i.created_at DESC, i.id DESC
LIMIT $2
"#;

#[derive(QueryableByName)]
struct VoteCountRow {
    #[diesel(sql_type = BigInt)]
    idea_id: i64,
    #[diesel(sql_type = Text)]
    title: String,
    #[diesel(sql_type = BigInt)]
    vote_count: i64,
}

#[derive(QueryableByName)]
struct ContributorRow {
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    user_id: Uuid,
    #[diesel(sql_type = Text)]
    display_name: String,
    #[diesel(sql_type = BigInt)]
    idea_count: i64,
}

#[derive(QueryableByName)]
struct PromotedRow {
    #[diesel(sql_type = BigInt)]
    idea_id: i64,
    #[diesel(sql_type = Text)]
    title: String,
    #[diesel(sql_type = Text)]
    group_name: String,
}

#[derive(QueryableByName)]
struct StatisticsRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
    #[diesel(sql_type = BigInt)]
    open: i64,
    #[diesel(sql_type = BigInt)]
    closed: i64,
    #[diesel(sql_type = BigInt)]
    promoted: i64,
}

#[derive(QueryableByName)]
struct EngagementRow {
    #[diesel(sql_type = BigInt)]
    group_id: i64,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = BigInt)]
    idea_count: i64,
    #[diesel(sql_type = BigInt)]
    vote_count: i64,
}

#[derive(QueryableByName)]
struct PersonalRow {
    #[diesel(sql_type = BigInt)]
    ideas_created: i64,
    #[diesel(sql_type = BigInt)]
    votes_cast: i64,
    #[diesel(sql_type = BigInt)]
    projects_involved: i64,
}

#[derive(QueryableByName)]
struct DashboardRow {
    #[diesel(sql_type = BigInt)]
    total_ideas: i64,
    #[diesel(sql_type = BigInt)]
    open_ideas: i64,
    #[diesel(sql_type = BigInt)]
    closed_ideas: i64,
    #[diesel(sql_type = BigInt)]
    promoted_ideas: i64,
    #[diesel(sql_type = BigInt)]
    total_groups: i64,
}

#[derive(QueryableByName)]
struct RecentRow {
    #[diesel(sql_type = BigInt)]
    idea_id: i64,
    #[diesel(sql_type = Text)]
    title: String,
    #[diesel(sql_type = Text)]
    status: String,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = BigInt)]
    group_id: i64,
    #[diesel(sql_type = Text)]
    group_name: String,
}

#[derive(Clone)]
pub struct DieselAnalyticsRepository {
    pool: DbPool,
}

impl DieselAnalyticsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AnalyticsRepositoryError {
    map_basic_pool_error(error, AnalyticsRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AnalyticsRepositoryError {
    map_basic_diesel_error(
        error,
        AnalyticsRepositoryError::query,
        AnalyticsRepositoryError::connection,
    )
}

#[async_trait]
impl AnalyticsRepository for DieselAnalyticsRepository {
    async fn most_voted(&self, limit: i64) -> Result<Vec<IdeaVoteCount>, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<VoteCountRow> = sql_query(MOST_VOTED_SQL)
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| IdeaVoteCount {
                idea_id: IdeaId::new(row.idea_id),
                title: row.title,
                vote_count: row.vote_count,
            })
            .collect())
    }

    async fn top_contributors(
        &self,
        limit: i64,
    ) -> Result<Vec<ContributorCount>, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ContributorRow> = sql_query(TOP_CONTRIBUTORS_SQL)
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| ContributorCount {
                user_id: UserId::from_uuid(row.user_id),
                display_name: row.display_name,
                idea_count: row.idea_count,
            })
            .collect())
    }

    async fn promoted_ideas(
        &self,
        limit: i64,
    ) -> Result<Vec<PromotedIdea>, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PromotedRow> = sql_query(PROMOTED_SQL)
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| PromotedIdea {
                idea_id: IdeaId::new(row.idea_id),
                title: row.title,
                group_name: row.group_name,
            })
            .collect())
    }

    async fn idea_statistics(&self) -> Result<IdeaStatistics, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: StatisticsRow = sql_query(IDEA_STATISTICS_SQL)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(IdeaStatistics {
            total: row.total,
            open: row.open,
            closed: row.closed,
            promoted: row.promoted,
        })
    }

    async fn group_engagement(
        &self,
        limit: i64,
    ) -> Result<Vec<GroupEngagement>, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<EngagementRow> = sql_query(GROUP_ENGAGEMENT_SQL)
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| GroupEngagement {
                group_id: GroupId::new(row.group_id),
                name: row.name,
                idea_count: row.idea_count,
                vote_count: row.vote_count,
            })
            .collect())
    }

    async fn personal_stats(
        &self,
        user: &UserId,
    ) -> Result<PersonalStats, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: PersonalRow = sql_query(PERSONAL_STATS_SQL)
            .bind::<diesel::sql_types::Uuid, _>(user.as_uuid())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(PersonalStats {
            ideas_created: row.ideas_created,
            votes_cast: row.votes_cast,
            projects_involved: row.projects_involved,
        })
    }

    async fn dashboard_stats(
        &self,
        user: &UserId,
    ) -> Result<DashboardStats, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: DashboardRow = sql_query(DASHBOARD_SQL)
            .bind::<diesel::sql_types::Uuid, _>(user.as_uuid())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(DashboardStats {
            total_ideas: row.total_ideas,
            open_ideas: row.open_ideas,
            closed_ideas: row.closed_ideas,
            promoted_ideas: row.promoted_ideas,
            total_groups: row.total_groups,
        })
    }

    async fn recent_activity(
        &self,
        user: &UserId,
        limit: i64,
    ) -> Result<Vec<RecentIdea>, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RecentRow> = sql_query(RECENT_ACTIVITY_SQL)
            .bind::<diesel::sql_types::Uuid, _>(user.as_uuid())
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| {
                let status = row.status.parse::<IdeaStatus>().map_err(|err| {
                    AnalyticsRepositoryError::query(format!("stored ideas.status is invalid: {err}"))
                })?;
                Ok(RecentIdea {
                    idea_id: IdeaId::new(row.idea_id),
                    title: row.title,
                    status,
                    created_at: row.created_at,
                    group_id: GroupId::new(row.group_id),
                    group_name: row.group_name,
                })
            })
            .collect()
    }
}
