//! Driving port for group reads.
use async_trait::async_trait;

use crate::domain::{
    Actor, Error, GroupDetails, GroupId, GroupOverview, PendingRequestView, UserSummary,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupQuery: Send + Sync {
    /// Every active group, annotated for the caller.
    async fn list(&self, actor: &Actor) -> Result<Vec<GroupOverview>, Error>;

    async fn details(&self, actor: &Actor, group: GroupId) -> Result<GroupDetails, Error>;

    async fn members(&self, actor: &Actor, group: GroupId) -> Result<Vec<UserSummary>, Error>;

    /// Pending requests; restricted to the group's administrators.
    async fn pending_requests(
        &self,
        actor: &Actor,
        group: GroupId,
    ) -> Result<Vec<PendingRequestView>, Error>;
}
