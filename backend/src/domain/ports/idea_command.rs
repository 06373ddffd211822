//! Driving port for idea mutations.
use async_trait::async_trait;

use crate::domain::{Actor, Error, GroupId, IdeaChanges, IdeaId, IdeaView, Title};

/// Validated create-idea payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIdeaRequest {
    pub title: Title,
    pub description: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdeaCommand: Send + Sync {
    /// Submit an idea to a group the caller belongs to.
    async fn create(
        &self,
        actor: &Actor,
        group: GroupId,
        request: CreateIdeaRequest,
    ) -> Result<IdeaView, Error>;

    /// Author-only edit.
    async fn update(
        &self,
        actor: &Actor,
        idea: IdeaId,
        changes: IdeaChanges,
    ) -> Result<IdeaView, Error>;

    /// Flag an idea as promoted to a project; group administrators only.
    async fn promote(&self, actor: &Actor, group: GroupId, idea: IdeaId)
    -> Result<IdeaView, Error>;

    /// Author-only soft delete.
    async fn delete(&self, actor: &Actor, idea: IdeaId) -> Result<(), Error>;
}
