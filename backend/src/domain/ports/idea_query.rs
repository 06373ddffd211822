//! Driving port for idea reads.
use async_trait::async_trait;

use crate::domain::{Actor, Error, GroupId, IdeaId, IdeaView};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdeaQuery: Send + Sync {
    /// Ideas in a group the caller belongs to, newest first.
    async fn list_for_group(&self, actor: &Actor, group: GroupId) -> Result<Vec<IdeaView>, Error>;

    async fn open(&self, actor: &Actor, group: GroupId, idea: IdeaId) -> Result<IdeaView, Error>;

    /// The caller's own ideas, newest first.
    async fn mine(&self, actor: &Actor) -> Result<Vec<IdeaView>, Error>;
}
