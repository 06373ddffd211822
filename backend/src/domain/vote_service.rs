//! Casting, withdrawing and listing votes.
//!
//! Each (user, idea) pair owns one vote row for life. Withdrawing flags the
//! row as deleted; voting again restores it with a fresh timestamp.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::access::{ensure_group_admin, load_group, require_member};
use super::ports::{
    GroupRepository, IdeaRepository, MembershipRepository, VoteCommand, VoteQuery, VoteRepository,
};
use super::{
    Actor, Error, GroupId, Idea, IdeaId, NewVote, SoftDeletable, VoteId, VoteReceipt, VoteView,
};

/// Vote service implementing [`VoteCommand`] and [`VoteQuery`].
pub struct VoteService<V, I, G, M> {
    votes: Arc<V>,
    ideas: Arc<I>,
    groups: Arc<G>,
    memberships: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<V, I, G, M> VoteService<V, I, G, M> {
    pub fn new(
        votes: Arc<V>,
        ideas: Arc<I>,
        groups: Arc<G>,
        memberships: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            votes,
            ideas,
            groups,
            memberships,
            clock,
        }
    }
}

impl<V, I, G, M> VoteService<V, I, G, M>
where
    I: IdeaRepository,
{
    async fn idea_in_group(&self, group: GroupId, idea: IdeaId) -> Result<Idea, Error> {
        self.ideas
            .find(idea)
            .await?
            .filter(|found| found.group_id == group)
            .ok_or_else(|| Error::not_found("Idea not found"))
    }
}

#[async_trait]
impl<V, I, G, M> VoteCommand for VoteService<V, I, G, M>
where
    V: VoteRepository,
    I: IdeaRepository,
    G: GroupRepository,
    M: MembershipRepository,
{
    async fn cast(
        &self,
        actor: &Actor,
        group: GroupId,
        idea: IdeaId,
    ) -> Result<VoteReceipt, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        require_member(self.memberships.as_ref(), actor, group.id).await?;
        let idea = self.idea_in_group(group.id, idea).await?;
        let now = self.clock.utc();

        match self.votes.find_for(actor.user_id(), idea.id).await? {
            Some(existing) if !existing.is_deleted() => {
                Err(Error::conflict(super::port_errors::ALREADY_VOTED))
            }
            Some(mut withdrawn) => {
                withdrawn.restore();
                withdrawn.voted_at = now;
                self.votes.save(&withdrawn).await?;
                info!(vote_id = %withdrawn.id, idea_id = %idea.id, "vote restored");
                Ok(VoteReceipt::from(&withdrawn))
            }
            None => {
                let vote = self
                    .votes
                    .insert(&NewVote {
                        user_id: *actor.user_id(),
                        idea_id: idea.id,
                        voted_at: now,
                    })
                    .await?;
                info!(vote_id = %vote.id, idea_id = %idea.id, "vote cast");
                Ok(VoteReceipt::from(&vote))
            }
        }
    }

    async fn unvote(&self, actor: &Actor, vote: VoteId) -> Result<(), Error> {
        let mut vote = self
            .votes
            .find(vote)
            .await?
            .filter(|found| !found.is_deleted())
            .ok_or_else(|| Error::not_found("Vote not found"))?;
        if vote.user_id != *actor.user_id() {
            return Err(Error::forbidden("You can only remove your own vote"));
        }
        vote.mark_deleted(self.clock.utc());
        self.votes.save(&vote).await?;
        info!(vote_id = %vote.id, "vote withdrawn");
        Ok(())
    }
}

#[async_trait]
impl<V, I, G, M> VoteQuery for VoteService<V, I, G, M>
where
    V: VoteRepository,
    I: IdeaRepository,
    G: GroupRepository,
    M: MembershipRepository,
{
    async fn list_for_idea(
        &self,
        actor: &Actor,
        group: GroupId,
        idea: IdeaId,
    ) -> Result<Vec<VoteView>, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        ensure_group_admin(actor, &group)?;
        let idea = self.idea_in_group(group.id, idea).await?;
        Ok(self.votes.list_for_idea(idea.id).await?)
    }
}
