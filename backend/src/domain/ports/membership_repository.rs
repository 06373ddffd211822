//! Port for group memberships and join requests.
use async_trait::async_trait;

use crate::domain::{
    GroupId, MembershipRequest, NewMembershipRequest, PendingRequestView, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by membership adapters.
    pub enum MembershipRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "membership repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "membership repository query failed: {message}",
        /// The user already belongs to a group.
        AlreadyMember => "user already belongs to a group",
        /// A pending request already exists for the (user, group) pair.
        DuplicatePending => "a pending request already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// The single group `user` currently belongs to, if any.
    async fn group_of(&self, user: &UserId) -> Result<Option<GroupId>, MembershipRepositoryError>;

    async fn pending_request(
        &self,
        user: &UserId,
        group: GroupId,
    ) -> Result<Option<MembershipRequest>, MembershipRepositoryError>;

    async fn insert_request(
        &self,
        request: &NewMembershipRequest,
    ) -> Result<MembershipRequest, MembershipRepositoryError>;

    /// Pending requests for `group`, oldest first.
    async fn pending_requests(
        &self,
        group: GroupId,
    ) -> Result<Vec<PendingRequestView>, MembershipRepositoryError>;

    /// Persist a decided request.
    ///
    /// The status write is conditional on the stored row still being
    /// pending; approval also inserts the membership row in the same
    /// transaction. Returns `false` when the row was no longer pending.
    async fn record_decision(
        &self,
        request: &MembershipRequest,
    ) -> Result<bool, MembershipRepositoryError>;

    /// Delete the membership row, returning whether one existed.
    async fn remove_membership(
        &self,
        user: &UserId,
        group: GroupId,
    ) -> Result<bool, MembershipRepositoryError>;
}
