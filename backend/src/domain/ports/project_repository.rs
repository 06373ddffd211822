//! Port for project storage.
use async_trait::async_trait;

use crate::domain::{GroupId, NewProject, Project, ProjectId, ProjectView};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by project repository adapters.
    pub enum ProjectRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
    }
}

/// Stored projects. Reads skip soft-deleted projects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert(&self, project: &NewProject) -> Result<Project, ProjectRepositoryError>;

    async fn find(&self, id: ProjectId) -> Result<Option<Project>, ProjectRepositoryError>;

    /// Persist every mutable field including the soft-delete marker.
    async fn save(&self, project: &Project) -> Result<(), ProjectRepositoryError>;

    async fn view(&self, id: ProjectId) -> Result<Option<ProjectView>, ProjectRepositoryError>;

    /// Projects in `group`, newest first.
    async fn list_for_group(
        &self,
        group: GroupId,
    ) -> Result<Vec<ProjectView>, ProjectRepositoryError>;
}
