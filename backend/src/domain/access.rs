//! Group-scoped access checks shared by the services.
//!
//! Group administration needs both the `GroupAdminOnly` role gate and
//! authorship of the targeted group. `SuperAdmin` skips the authorship check.

use super::ports::{GroupRepository, MembershipRepository};
use super::{Actor, Error, Group, GroupId, Policy};

pub(crate) const NOT_A_MEMBER: &str = "You are not a member of this group";

/// Load an active group or fail with `NotFound`.
pub(crate) async fn load_group<G>(groups: &G, id: GroupId) -> Result<Group, Error>
where
    G: GroupRepository + ?Sized,
{
    groups
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("Group not found"))
}

/// Fail with `Forbidden` unless `actor` administers `group`.
pub(crate) fn ensure_group_admin(actor: &Actor, group: &Group) -> Result<(), Error> {
    actor.require(Policy::GroupAdminOnly)?;
    if actor.is_super_admin() || group.is_created_by(actor.user_id()) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %actor.user_id(),
            group_id = %group.id,
            "group admin does not own the group"
        );
        Err(Error::forbidden("only this group's administrator may do that"))
    }
}

/// Fail with `Forbidden` unless `actor` belongs to `group`.
pub(crate) async fn require_member<M>(
    memberships: &M,
    actor: &Actor,
    group: GroupId,
) -> Result<(), Error>
where
    M: MembershipRepository + ?Sized,
{
    match memberships.group_of(actor.user_id()).await? {
        Some(current) if current == group => Ok(()),
        _ => Err(Error::forbidden(NOT_A_MEMBER)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockMembershipRepository;
    use crate::domain::{Deletion, ErrorCode, Role, RoleSet, Title, UserId};
    use crate::test_support::fixture_timestamp;
    use rstest::rstest;

    fn group_created_by(owner: UserId) -> Group {
        Group {
            id: GroupId::new(3),
            name: Title::new("Eng").expect("title"),
            description: String::new(),
            is_active: true,
            created_by: owner,
            created_at: fixture_timestamp(),
            deletion: Deletion::live(),
        }
    }

    fn actor(id: UserId, roles: &[Role]) -> Actor {
        Actor::new(id, roles.iter().copied().collect::<RoleSet>())
    }

    #[rstest]
    #[case(&[Role::RegularUser, Role::GroupAdmin], true, true)]
    #[case(&[Role::RegularUser, Role::GroupAdmin], false, false)]
    #[case(&[Role::RegularUser], true, false)]
    #[case(&[Role::SuperAdmin], false, true)]
    fn admin_needs_role_and_authorship(
        #[case] roles: &[Role],
        #[case] owns_group: bool,
        #[case] allowed: bool,
    ) {
        let caller = UserId::random();
        let owner = if owns_group { caller } else { UserId::random() };
        let result = ensure_group_admin(&actor(caller, roles), &group_created_by(owner));
        assert_eq!(result.is_ok(), allowed);
        if let Err(error) = result {
            assert_eq!(error.code(), ErrorCode::Forbidden);
        }
    }

    #[rstest]
    #[case(Some(GroupId::new(3)), true)]
    #[case(Some(GroupId::new(4)), false)]
    #[case(None, false)]
    #[tokio::test]
    async fn membership_is_checked_against_the_target_group(
        #[case] current: Option<GroupId>,
        #[case] allowed: bool,
    ) {
        let mut memberships = MockMembershipRepository::new();
        memberships
            .expect_group_of()
            .times(1)
            .return_once(move |_| Ok(current));
        let caller = actor(UserId::random(), &[Role::RegularUser]);
        let result = require_member(&memberships, &caller, GroupId::new(3)).await;
        assert_eq!(result.is_ok(), allowed);
    }
}
