//! Driving port for vote listings.
use async_trait::async_trait;

use crate::domain::{Actor, Error, GroupId, IdeaId, VoteView};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteQuery: Send + Sync {
    /// Active votes on an idea; group administrators only.
    async fn list_for_idea(
        &self,
        actor: &Actor,
        group: GroupId,
        idea: IdeaId,
    ) -> Result<Vec<VoteView>, Error>;
}
