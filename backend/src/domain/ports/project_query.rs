//! Driving port for project reads.
use async_trait::async_trait;

use crate::domain::{Actor, Error, GroupId, ProjectId, ProjectView};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectQuery: Send + Sync {
    async fn list_for_group(&self, actor: &Actor, group: GroupId)
    -> Result<Vec<ProjectView>, Error>;

    async fn open(
        &self,
        actor: &Actor,
        group: GroupId,
        project: ProjectId,
    ) -> Result<ProjectView, Error>;
}
