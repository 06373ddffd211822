//! Port for group storage.
use async_trait::async_trait;

use crate::domain::{Group, GroupDetails, GroupId, GroupOverview, NewGroup, UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by group repository adapters.
    pub enum GroupRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "group repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "group repository query failed: {message}",
        /// The founder already belongs to a group.
        FounderAlreadyMember => "user already belongs to a group",
    }
}

/// Stored groups. Soft-deleted groups are invisible to every read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Create the group, enrol its founder and grant the founder the
    /// `GroupAdmin` role in one transaction.
    async fn create_with_founder(&self, group: &NewGroup) -> Result<Group, GroupRepositoryError>;

    async fn find(&self, id: GroupId) -> Result<Option<Group>, GroupRepositoryError>;

    /// Active groups annotated for `viewer`.
    async fn list_overviews(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<GroupOverview>, GroupRepositoryError>;

    async fn details(&self, id: GroupId) -> Result<Option<GroupDetails>, GroupRepositoryError>;

    async fn members(&self, id: GroupId) -> Result<Vec<UserSummary>, GroupRepositoryError>;

    /// Persist descriptive fields.
    async fn save(&self, group: &Group) -> Result<(), GroupRepositoryError>;

    /// Persist the soft-delete marker of `group` and drop its memberships.
    async fn archive(&self, group: &Group) -> Result<(), GroupRepositoryError>;
}
