//! Group lifecycle and the membership request workflow.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::access::{ensure_group_admin, load_group};
use super::ports::{
    CreateGroupRequest, GroupCommand, GroupQuery, GroupRepository, MembershipRepository,
};
use super::{
    Actor, Decision, Error, GroupChanges, GroupDetails, GroupId, GroupOverview,
    MembershipRequest, NewGroup, NewMembershipRequest, PendingRequestView, SoftDeletable, UserId,
    UserSummary,
};

const REQUEST_NOT_FOUND: &str = "Request not found";

/// Group service implementing [`GroupCommand`] and [`GroupQuery`].
pub struct GroupService<G, M> {
    groups: Arc<G>,
    memberships: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<G, M> GroupService<G, M> {
    pub fn new(groups: Arc<G>, memberships: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            groups,
            memberships,
            clock,
        }
    }
}

impl<G, M> GroupService<G, M>
where
    G: GroupRepository,
    M: MembershipRepository,
{
    async fn details_of(&self, group: GroupId) -> Result<GroupDetails, Error> {
        self.groups
            .details(group)
            .await?
            .ok_or_else(|| Error::not_found("Group not found"))
    }
}

#[async_trait]
impl<G, M> GroupCommand for GroupService<G, M>
where
    G: GroupRepository,
    M: MembershipRepository,
{
    async fn create(
        &self,
        actor: &Actor,
        request: CreateGroupRequest,
    ) -> Result<GroupDetails, Error> {
        if self.memberships.group_of(actor.user_id()).await?.is_some() {
            return Err(Error::conflict(super::port_errors::ALREADY_IN_A_GROUP));
        }
        let group = self
            .groups
            .create_with_founder(&NewGroup {
                name: request.name,
                description: request.description,
                created_by: *actor.user_id(),
                created_at: self.clock.utc(),
            })
            .await?;
        info!(group_id = %group.id, user_id = %actor.user_id(), "group created");
        self.details_of(group.id).await
    }

    async fn request_join(
        &self,
        actor: &Actor,
        group: GroupId,
    ) -> Result<MembershipRequest, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        let user = actor.user_id();
        if self.memberships.group_of(user).await? == Some(group.id) {
            return Err(Error::conflict("You are already a member of this group"));
        }
        if self
            .memberships
            .pending_request(user, group.id)
            .await?
            .is_some()
        {
            return Err(Error::conflict(super::port_errors::DUPLICATE_PENDING));
        }
        let request = self
            .memberships
            .insert_request(&NewMembershipRequest {
                user_id: *user,
                group_id: group.id,
                requested_at: self.clock.utc(),
            })
            .await?;
        info!(group_id = %group.id, user_id = %user, "join request filed");
        Ok(request)
    }

    async fn decide(
        &self,
        actor: &Actor,
        group: GroupId,
        applicant: UserId,
        decision: Decision,
    ) -> Result<MembershipRequest, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        ensure_group_admin(actor, &group)?;
        let mut request = self
            .memberships
            .pending_request(&applicant, group.id)
            .await?
            .ok_or_else(|| Error::not_found(REQUEST_NOT_FOUND))?;

        if decision == Decision::Approve {
            match self.memberships.group_of(&applicant).await? {
                Some(current) if current == group.id => {
                    return Err(Error::conflict("User is already a member of the group"));
                }
                Some(_) => {
                    return Err(Error::conflict(
                        super::port_errors::APPLICANT_IN_ANOTHER_GROUP,
                    ));
                }
                None => {}
            }
        }

        request
            .decide(decision, self.clock.utc())
            .map_err(|_| Error::not_found(REQUEST_NOT_FOUND))?;
        if !self.memberships.record_decision(&request).await? {
            return Err(Error::not_found(REQUEST_NOT_FOUND));
        }
        info!(
            group_id = %group.id,
            applicant = %applicant,
            status = %request.status,
            "join request decided"
        );
        Ok(request)
    }

    async fn leave(&self, actor: &Actor, group: GroupId) -> Result<(), Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        if !self
            .memberships
            .remove_membership(actor.user_id(), group.id)
            .await?
        {
            return Err(Error::invalid_request(
                "You can't leave a group you're not a part of",
            ));
        }
        info!(group_id = %group.id, user_id = %actor.user_id(), "member left group");
        Ok(())
    }

    async fn update(
        &self,
        actor: &Actor,
        group: GroupId,
        changes: GroupChanges,
    ) -> Result<GroupDetails, Error> {
        let mut group = load_group(self.groups.as_ref(), group).await?;
        ensure_group_admin(actor, &group)?;
        changes.apply_to(&mut group);
        self.groups.save(&group).await?;
        self.details_of(group.id).await
    }

    async fn delete(&self, actor: &Actor, group: GroupId) -> Result<(), Error> {
        let mut group = load_group(self.groups.as_ref(), group).await?;
        ensure_group_admin(actor, &group)?;
        group.mark_deleted(self.clock.utc());
        self.groups.archive(&group).await?;
        info!(group_id = %group.id, user_id = %actor.user_id(), "group deleted");
        Ok(())
    }
}

#[async_trait]
impl<G, M> GroupQuery for GroupService<G, M>
where
    G: GroupRepository,
    M: MembershipRepository,
{
    async fn list(&self, actor: &Actor) -> Result<Vec<GroupOverview>, Error> {
        Ok(self.groups.list_overviews(actor.user_id()).await?)
    }

    async fn details(&self, _actor: &Actor, group: GroupId) -> Result<GroupDetails, Error> {
        self.details_of(group).await
    }

    async fn members(&self, _actor: &Actor, group: GroupId) -> Result<Vec<UserSummary>, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        Ok(self.groups.members(group.id).await?)
    }

    async fn pending_requests(
        &self,
        actor: &Actor,
        group: GroupId,
    ) -> Result<Vec<PendingRequestView>, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        ensure_group_admin(actor, &group)?;
        Ok(self.memberships.pending_requests(group.id).await?)
    }
}

#[cfg(test)]
#[path = "group_service_tests.rs"]
mod tests;
