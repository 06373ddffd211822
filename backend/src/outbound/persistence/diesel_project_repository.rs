//! PostgreSQL-backed `ProjectRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::{GroupId, NewProject, Project, ProjectId, ProjectStatus, ProjectView};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_invalid_row,
};
use super::models::{InvalidRow, NewProjectRow, ProjectRow, ProjectUpdate, ProjectViewRow};
use super::pool::{DbPool, PoolError};
use super::schema::projects;

type ActiveProjects =
    diesel::dsl::Filter<projects::table, diesel::dsl::Eq<projects::is_deleted, bool>>;

/// Projects that have not been soft-deleted.
pub(crate) fn active() -> ActiveProjects {
    projects::table.filter(projects::is_deleted.eq(false))
}

macro_rules! project_view_sql {
    ($tail:literal) => {
        concat!(
            r#"
SELECT p.id, p.title, p.description, p.status, p.created_by, p.overseen_by,
       o.display_name AS overseer_name,
       p.idea_id, COALESCE(i.title, '') AS idea_title,
       p.group_id, COALESCE(g.name, '') AS group_name,
       p.created_at, p.updated_at
FROM projects p
JOIN users o ON o.id = p.overseen_by
LEFT JOIN ideas i ON i.id = p.idea_id
LEFT JOIN groups g ON g.id = p.group_id AND g.is_deleted = FALSE
WHERE p.is_deleted = FALSE
"#,
            $tail
        )
    };
}

const VIEW_BY_ID_SQL: &str = project_view_sql!("AND p.id = $1");
const VIEWS_BY_GROUP_SQL: &str =
    project_view_sql!("AND p.group_id = $1 ORDER BY p.created_at DESC, p.id DESC");

#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProjectRepositoryError {
    map_basic_pool_error(error, ProjectRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProjectRepositoryError {
    map_basic_diesel_error(
        error,
        ProjectRepositoryError::query,
        ProjectRepositoryError::connection,
    )
}

fn map_row_error(error: InvalidRow) -> ProjectRepositoryError {
    map_invalid_row(error, ProjectRepositoryError::query)
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(&self, project: &NewProject) -> Result<Project, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(projects::table)
            .values(NewProjectRow {
                title: project.title.as_ref(),
                description: &project.description,
                status: ProjectStatus::Planning.as_str(),
                created_by: *project.created_by.as_uuid(),
                overseen_by: *project.overseen_by.as_uuid(),
                idea_id: project.idea_id.get(),
                group_id: project.group_id.get(),
                created_at: project.created_at,
            })
            .returning(ProjectRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Project::try_from(row).map_err(map_row_error)
    }

    async fn find(&self, id: ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        active()
            .filter(projects::id.eq(id.get()))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| Project::try_from(row).map_err(map_row_error))
            .transpose()
    }

    async fn save(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(projects::table.filter(projects::id.eq(project.id.get())))
            .set(ProjectUpdate::from(project))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn view(&self, id: ProjectId) -> Result<Option<ProjectView>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProjectViewRow> = sql_query(VIEW_BY_ID_SQL)
            .bind::<BigInt, _>(id.get())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| ProjectView::try_from(row).map_err(map_row_error))
            .transpose()
    }

    async fn list_for_group(
        &self,
        group: GroupId,
    ) -> Result<Vec<ProjectView>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProjectViewRow> = sql_query(VIEWS_BY_GROUP_SQL)
            .bind::<BigInt, _>(group.get())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| ProjectView::try_from(row).map_err(map_row_error))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_listing_is_newest_first() {
        assert!(VIEWS_BY_GROUP_SQL.contains("ORDER BY p.created_at DESC"));
        assert!(VIEWS_BY_GROUP_SQL.contains("p.is_deleted = FALSE"));
    }

    #[test]
    fn views_require_a_known_overseer() {
        assert!(VIEW_BY_ID_SQL.contains("JOIN users o ON o.id = p.overseen_by"));
    }
}
