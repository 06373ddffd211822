//! Driving port for group mutations and the join-request workflow.
use async_trait::async_trait;

use crate::domain::{
    Actor, Decision, Error, GroupChanges, GroupDetails, GroupId, MembershipRequest, Title, UserId,
};

/// Validated create-group payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupRequest {
    pub name: Title,
    pub description: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupCommand: Send + Sync {
    /// Create a group led by the caller, who must not belong to any group.
    async fn create(&self, actor: &Actor, request: CreateGroupRequest)
    -> Result<GroupDetails, Error>;

    /// File a pending join request.
    async fn request_join(&self, actor: &Actor, group: GroupId)
    -> Result<MembershipRequest, Error>;

    /// Approve or reject the pending request of `applicant`.
    async fn decide(
        &self,
        actor: &Actor,
        group: GroupId,
        applicant: UserId,
        decision: Decision,
    ) -> Result<MembershipRequest, Error>;

    async fn leave(&self, actor: &Actor, group: GroupId) -> Result<(), Error>;

    async fn update(
        &self,
        actor: &Actor,
        group: GroupId,
        changes: GroupChanges,
    ) -> Result<GroupDetails, Error>;

    /// Soft-delete the group and dissolve its memberships.
    async fn delete(&self, actor: &Actor, group: GroupId) -> Result<(), Error>;
}
