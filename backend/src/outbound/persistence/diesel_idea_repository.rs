//! PostgreSQL-backed `IdeaRepository`.
//!
//! Views join the author, the group name and the live vote count in one
//! statement. A soft-deleted group leaves its ideas with an empty group name.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IdeaRepository, IdeaRepositoryError};
use crate::domain::{GroupId, Idea, IdeaId, IdeaStatus, IdeaView, NewIdea, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_invalid_row,
};
use super::models::{IdeaRow, IdeaUpdate, IdeaViewRow, InvalidRow, NewIdeaRow};
use super::pool::{DbPool, PoolError};
use super::schema::ideas;

type ActiveIdeas = diesel::dsl::Filter<ideas::table, diesel::dsl::Eq<ideas::is_deleted, bool>>;

/// Ideas that have not been soft-deleted.
pub(crate) fn active() -> ActiveIdeas {
    ideas::table.filter(ideas::is_deleted.eq(false))
}

macro_rules! idea_view_sql {
    ($tail:literal) => {
        concat!(
            r#"
SELECT i.id, i.title, i.description, i.status, i.is_promoted_to_project,
       u.id AS author_id, u.display_name AS author_name, u.email AS author_email,
       i.group_id, COALESCE(g.name, '') AS group_name,
       (SELECT COUNT(*) FROM votes v WHERE v.idea_id = i.id AND v.is_deleted = FALSE)
           AS vote_count,
       i.created_at, i.updated_at
FROM ideas i
JOIN users u ON u.id = i.author_id
LEFT JOIN groups g ON g.id = i.group_id AND g.is_deleted = FALSE
WHERE i.is_deleted = FALSE
"#,
            $tail
        )
    };
}

const VIEW_BY_ID_SQL: &str = idea_view_sql!("AND i.id = $1");
const VIEWS_BY_GROUP_SQL: &str =
    idea_view_sql!("AND i.group_id = $1 ORDER BY i.created_at DESC, i.id DESC");
const VIEWS_BY_AUTHOR_SQL: &str =
    idea_view_sql!("AND i.author_id = $1 ORDER BY i.created_at DESC, i.id DESC");

#[derive(Clone)]
pub struct DieselIdeaRepository {
    pool: DbPool,
}

impl DieselIdeaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IdeaRepositoryError {
    map_basic_pool_error(error, IdeaRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> IdeaRepositoryError {
    map_basic_diesel_error(
        error,
        IdeaRepositoryError::query,
        IdeaRepositoryError::connection,
    )
}

fn map_row_error(error: InvalidRow) -> IdeaRepositoryError {
    map_invalid_row(error, IdeaRepositoryError::query)
}

fn into_views(rows: Vec<IdeaViewRow>) -> Result<Vec<IdeaView>, IdeaRepositoryError> {
    rows.into_iter()
        .map(|row| IdeaView::try_from(row).map_err(map_row_error))
        .collect()
}

#[async_trait]
impl IdeaRepository for DieselIdeaRepository {
    async fn insert(&self, idea: &NewIdea) -> Result<Idea, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(ideas::table)
            .values(NewIdeaRow {
                title: idea.title.as_ref(),
                description: &idea.description,
                status: IdeaStatus::Open.as_str(),
                author_id: *idea.author_id.as_uuid(),
                group_id: idea.group_id.get(),
                created_at: idea.created_at,
            })
            .returning(IdeaRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Idea::try_from(row).map_err(map_row_error)
    }

    async fn find(&self, id: IdeaId) -> Result<Option<Idea>, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        active()
            .filter(ideas::id.eq(id.get()))
            .select(IdeaRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| Idea::try_from(row).map_err(map_row_error))
            .transpose()
    }

    async fn save(&self, idea: &Idea) -> Result<(), IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(ideas::table.filter(ideas::id.eq(idea.id.get())))
            .set(IdeaUpdate::from(idea))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn view(&self, id: IdeaId) -> Result<Option<IdeaView>, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<IdeaViewRow> = sql_query(VIEW_BY_ID_SQL)
            .bind::<BigInt, _>(id.get())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| IdeaView::try_from(row).map_err(map_row_error))
            .transpose()
    }

    async fn list_for_group(&self, group: GroupId) -> Result<Vec<IdeaView>, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<IdeaViewRow> = sql_query(VIEWS_BY_GROUP_SQL)
            .bind::<BigInt, _>(group.get())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_views(rows)
    }

    async fn list_for_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<IdeaView>, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<IdeaViewRow> = sql_query(VIEWS_BY_AUTHOR_SQL)
            .bind::<diesel::sql_types::Uuid, _>(author.as_uuid())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_views(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(VIEW_BY_ID_SQL, "AND i.id = $1")]
    #[case(VIEWS_BY_GROUP_SQL, "AND i.group_id = $1")]
    #[case(VIEWS_BY_AUTHOR_SQL, "AND i.author_id = $1")]
    fn view_queries_skip_deleted_ideas(#[case] sql: &str, #[case] predicate: &str) {
        assert!(sql.contains("WHERE i.is_deleted = FALSE"));
        assert!(sql.trim_end().contains(predicate));
    }

    #[rstest]
    fn vote_count_ignores_withdrawn_votes() {
        assert!(VIEW_BY_ID_SQL.contains("v.is_deleted = FALSE"));
    }
}
