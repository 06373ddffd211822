//! Driving port for project mutations.
use async_trait::async_trait;

use crate::domain::{
    Actor, EmailAddress, Error, GroupId, IdeaId, ProjectId, ProjectStatus, ProjectView, Title,
};

/// Validated create-project payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub title: Title,
    pub description: String,
    pub overseen_by_email: EmailAddress,
}

/// Validated partial project update; the overseer is named by email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub overseen_by_email: Option<EmailAddress>,
    pub status: Option<ProjectStatus>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectCommand: Send + Sync {
    /// Start a project from a promoted idea; group administrators only.
    async fn create(
        &self,
        actor: &Actor,
        group: GroupId,
        idea: IdeaId,
        request: CreateProjectRequest,
    ) -> Result<ProjectView, Error>;

    /// Edit by the project's creator or overseer.
    async fn update(
        &self,
        actor: &Actor,
        project: ProjectId,
        request: UpdateProjectRequest,
    ) -> Result<ProjectView, Error>;

    /// Creator-only soft delete.
    async fn delete(&self, actor: &Actor, project: ProjectId) -> Result<(), Error>;
}
