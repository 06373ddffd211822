//! Projects started from promoted ideas.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::access::{ensure_group_admin, load_group, require_member};
use super::ports::{
    CreateProjectRequest, GroupRepository, IdeaRepository, MembershipRepository, ProjectCommand,
    ProjectQuery, ProjectRepository, UpdateProjectRequest, UserRepository,
};
use super::{
    Actor, EmailAddress, Error, GroupId, IdeaId, NewProject, Project, ProjectChanges, ProjectId,
    ProjectView, SoftDeletable, UserId,
};

const PROJECT_NOT_FOUND: &str = "Project not found";

/// Repositories consulted by [`ProjectService`].
pub struct ProjectServiceDeps<P, I, G, M, U> {
    pub projects: Arc<P>,
    pub ideas: Arc<I>,
    pub groups: Arc<G>,
    pub memberships: Arc<M>,
    pub users: Arc<U>,
}

/// Project service implementing [`ProjectCommand`] and [`ProjectQuery`].
pub struct ProjectService<P, I, G, M, U> {
    projects: Arc<P>,
    ideas: Arc<I>,
    groups: Arc<G>,
    memberships: Arc<M>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, I, G, M, U> ProjectService<P, I, G, M, U> {
    pub fn new(deps: ProjectServiceDeps<P, I, G, M, U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            projects: deps.projects,
            ideas: deps.ideas,
            groups: deps.groups,
            memberships: deps.memberships,
            users: deps.users,
            clock,
        }
    }
}

impl<P, I, G, M, U> ProjectService<P, I, G, M, U>
where
    P: ProjectRepository,
    U: UserRepository,
{
    async fn resolve_overseer(&self, email: &EmailAddress) -> Result<UserId, Error> {
        self.users
            .find_by_email(email)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| Error::not_found("Overseer not found"))
    }

    async fn view_of(&self, project: ProjectId) -> Result<ProjectView, Error> {
        self.projects
            .view(project)
            .await?
            .ok_or_else(|| Error::not_found(PROJECT_NOT_FOUND))
    }

    async fn find(&self, project: ProjectId) -> Result<Project, Error> {
        self.projects
            .find(project)
            .await?
            .ok_or_else(|| Error::not_found(PROJECT_NOT_FOUND))
    }
}

#[async_trait]
impl<P, I, G, M, U> ProjectCommand for ProjectService<P, I, G, M, U>
where
    P: ProjectRepository,
    I: IdeaRepository,
    G: GroupRepository,
    M: MembershipRepository,
    U: UserRepository,
{
    async fn create(
        &self,
        actor: &Actor,
        group: GroupId,
        idea: IdeaId,
        request: CreateProjectRequest,
    ) -> Result<ProjectView, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        ensure_group_admin(actor, &group)?;
        let idea = self
            .ideas
            .find(idea)
            .await?
            .filter(|found| found.group_id == group.id)
            .ok_or_else(|| Error::not_found("Idea not found"))?;
        if !idea.is_promoted_to_project {
            return Err(Error::invalid_request(
                "Idea must be promoted before a project can be created",
            ));
        }
        let overseer = self.resolve_overseer(&request.overseen_by_email).await?;
        let project = self
            .projects
            .insert(&NewProject {
                title: request.title,
                description: request.description,
                created_by: *actor.user_id(),
                overseen_by: overseer,
                idea_id: idea.id,
                group_id: group.id,
                created_at: self.clock.utc(),
            })
            .await?;
        info!(project_id = %project.id, idea_id = %idea.id, "project created");
        self.view_of(project.id).await
    }

    async fn update(
        &self,
        actor: &Actor,
        project: ProjectId,
        request: UpdateProjectRequest,
    ) -> Result<ProjectView, Error> {
        let mut project = self.find(project).await?;
        if !project.is_editable_by(actor.user_id()) {
            return Err(Error::forbidden(
                "Only the project's creator or overseer may edit it",
            ));
        }
        let overseen_by = match &request.overseen_by_email {
            Some(email) => Some(self.resolve_overseer(email).await?),
            None => None,
        };
        ProjectChanges {
            title: request.title,
            description: request.description,
            overseen_by,
            status: request.status,
        }
        .apply_to(&mut project, self.clock.utc());
        self.projects.save(&project).await?;
        self.view_of(project.id).await
    }

    async fn delete(&self, actor: &Actor, project: ProjectId) -> Result<(), Error> {
        let mut project = self.find(project).await?;
        if project.created_by != *actor.user_id() {
            return Err(Error::forbidden("Only the project's creator may delete it"));
        }
        project.mark_deleted(self.clock.utc());
        self.projects.save(&project).await?;
        info!(project_id = %project.id, "project deleted");
        Ok(())
    }
}

#[async_trait]
impl<P, I, G, M, U> ProjectQuery for ProjectService<P, I, G, M, U>
where
    P: ProjectRepository,
    I: IdeaRepository,
    G: GroupRepository,
    M: MembershipRepository,
    U: UserRepository,
{
    async fn list_for_group(
        &self,
        actor: &Actor,
        group: GroupId,
    ) -> Result<Vec<ProjectView>, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        require_member(self.memberships.as_ref(), actor, group.id).await?;
        Ok(self.projects.list_for_group(group.id).await?)
    }

    async fn open(
        &self,
        actor: &Actor,
        group: GroupId,
        project: ProjectId,
    ) -> Result<ProjectView, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        require_member(self.memberships.as_ref(), actor, group.id).await?;
        self.projects
            .view(project)
            .await?
            .filter(|view| view.group_id == group.id)
            .ok_or_else(|| Error::not_found(PROJECT_NOT_FOUND))
    }
}
