//! Idea submission, editing and promotion.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::access::{ensure_group_admin, load_group, require_member};
use super::ports::{
    CreateIdeaRequest, GroupRepository, IdeaCommand, IdeaQuery, IdeaRepository,
    MembershipRepository,
};
use super::{
    Actor, Error, GroupId, Idea, IdeaChanges, IdeaId, IdeaView, NewIdea, SoftDeletable,
};

const IDEA_NOT_FOUND: &str = "Idea not found";

/// Idea service implementing [`IdeaCommand`] and [`IdeaQuery`].
pub struct IdeaService<I, G, M> {
    ideas: Arc<I>,
    groups: Arc<G>,
    memberships: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<I, G, M> IdeaService<I, G, M> {
    pub fn new(ideas: Arc<I>, groups: Arc<G>, memberships: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ideas,
            groups,
            memberships,
            clock,
        }
    }
}

impl<I, G, M> IdeaService<I, G, M>
where
    I: IdeaRepository,
    G: GroupRepository,
    M: MembershipRepository,
{
    async fn view_of(&self, idea: IdeaId) -> Result<IdeaView, Error> {
        self.ideas
            .view(idea)
            .await?
            .ok_or_else(|| Error::not_found(IDEA_NOT_FOUND))
    }

    /// Ideas edited through this service must be the caller's own; anything
    /// else is reported as missing.
    async fn authored_idea(&self, actor: &Actor, idea: IdeaId) -> Result<Idea, Error> {
        self.ideas
            .find(idea)
            .await?
            .filter(|found| found.author_id == *actor.user_id())
            .ok_or_else(|| Error::not_found(IDEA_NOT_FOUND))
    }

    async fn idea_in_group(&self, group: GroupId, idea: IdeaId) -> Result<Idea, Error> {
        self.ideas
            .find(idea)
            .await?
            .filter(|found| found.group_id == group)
            .ok_or_else(|| Error::not_found(IDEA_NOT_FOUND))
    }
}

#[async_trait]
impl<I, G, M> IdeaCommand for IdeaService<I, G, M>
where
    I: IdeaRepository,
    G: GroupRepository,
    M: MembershipRepository,
{
    async fn create(
        &self,
        actor: &Actor,
        group: GroupId,
        request: CreateIdeaRequest,
    ) -> Result<IdeaView, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        require_member(self.memberships.as_ref(), actor, group.id).await?;
        let idea = self
            .ideas
            .insert(&NewIdea {
                title: request.title,
                description: request.description,
                author_id: *actor.user_id(),
                group_id: group.id,
                created_at: self.clock.utc(),
            })
            .await?;
        info!(idea_id = %idea.id, group_id = %group.id, "idea created");
        self.view_of(idea.id).await
    }

    async fn update(
        &self,
        actor: &Actor,
        idea: IdeaId,
        changes: IdeaChanges,
    ) -> Result<IdeaView, Error> {
        let mut idea = self.authored_idea(actor, idea).await?;
        changes.apply_to(&mut idea, self.clock.utc());
        self.ideas.save(&idea).await?;
        self.view_of(idea.id).await
    }

    async fn promote(
        &self,
        actor: &Actor,
        group: GroupId,
        idea: IdeaId,
    ) -> Result<IdeaView, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        ensure_group_admin(actor, &group)?;
        let mut idea = self.idea_in_group(group.id, idea).await?;
        idea.is_promoted_to_project = true;
        idea.updated_at = Some(self.clock.utc());
        self.ideas.save(&idea).await?;
        info!(idea_id = %idea.id, group_id = %group.id, "idea promoted");
        self.view_of(idea.id).await
    }

    async fn delete(&self, actor: &Actor, idea: IdeaId) -> Result<(), Error> {
        let mut idea = self.authored_idea(actor, idea).await?;
        idea.mark_deleted(self.clock.utc());
        self.ideas.save(&idea).await?;
        info!(idea_id = %idea.id, "idea deleted");
        Ok(())
    }
}

#[async_trait]
impl<I, G, M> IdeaQuery for IdeaService<I, G, M>
where
    I: IdeaRepository,
    G: GroupRepository,
    M: MembershipRepository,
{
    async fn list_for_group(&self, actor: &Actor, group: GroupId) -> Result<Vec<IdeaView>, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        require_member(self.memberships.as_ref(), actor, group.id).await?;
        Ok(self.ideas.list_for_group(group.id).await?)
    }

    async fn open(&self, actor: &Actor, group: GroupId, idea: IdeaId) -> Result<IdeaView, Error> {
        let group = load_group(self.groups.as_ref(), group).await?;
        require_member(self.memberships.as_ref(), actor, group.id).await?;
        self.ideas
            .view(idea)
            .await?
            .filter(|view| view.group_id == group.id)
            .ok_or_else(|| Error::not_found(IDEA_NOT_FOUND))
    }

    async fn mine(&self, actor: &Actor) -> Result<Vec<IdeaView>, Error> {
        Ok(self.ideas.list_for_author(actor.user_id()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockGroupRepository, MockIdeaRepository, MockMembershipRepository,
    };
    use crate::domain::{
        Deletion, ErrorCode, Group, IdeaStatus, Role, RoleSet, Title, UserId, UserSummary,
    };
    use crate::test_support::{ManualClock, fixture_timestamp};

    const GROUP: GroupId = GroupId::new(2);
    const IDEA: IdeaId = IdeaId::new(5);

    struct Mocks {
        ideas: MockIdeaRepository,
        groups: MockGroupRepository,
        memberships: MockMembershipRepository,
    }

    impl Mocks {
        fn new(owner: UserId) -> Self {
            let mut groups = MockGroupRepository::new();
            groups.expect_find().returning(move |_| {
                Ok(Some(Group {
                    id: GROUP,
                    name: Title::new("Eng").expect("title"),
                    description: String::new(),
                    is_active: true,
                    created_by: owner,
                    created_at: fixture_timestamp(),
                    deletion: Deletion::live(),
                }))
            });
            Self {
                ideas: MockIdeaRepository::new(),
                groups,
                memberships: MockMembershipRepository::new(),
            }
        }

        fn build(
            self,
        ) -> IdeaService<MockIdeaRepository, MockGroupRepository, MockMembershipRepository> {
            IdeaService::new(
                Arc::new(self.ideas),
                Arc::new(self.groups),
                Arc::new(self.memberships),
                Arc::new(ManualClock::new(fixture_timestamp())),
            )
        }
    }

    fn idea_by(author: UserId) -> Idea {
        Idea {
            id: IDEA,
            title: Title::new("Faster CI").expect("title"),
            description: "cache builds".to_owned(),
            status: IdeaStatus::Open,
            is_promoted_to_project: false,
            author_id: author,
            group_id: GROUP,
            created_at: fixture_timestamp(),
            updated_at: None,
            deletion: Deletion::live(),
        }
    }

    fn member(id: UserId) -> Actor {
        Actor::new(id, RoleSet::from([Role::RegularUser]))
    }

    #[tokio::test]
    async fn create_requires_membership() {
        let mut mocks = Mocks::new(UserId::random());
        mocks.memberships.expect_group_of().return_once(|_| Ok(None));
        mocks.ideas.expect_insert().never();

        let error = mocks
            .build()
            .create(
                &member(UserId::random()),
                GROUP,
                CreateIdeaRequest {
                    title: Title::new("Faster CI").expect("title"),
                    description: String::new(),
                },
            )
            .await
            .expect_err("not a member");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn update_by_non_author_is_not_found() {
        let mut mocks = Mocks::new(UserId::random());
        mocks
            .ideas
            .expect_find()
            .return_once(|_| Ok(Some(idea_by(UserId::random()))));
        mocks.ideas.expect_save().never();

        let error = mocks
            .build()
            .update(&member(UserId::random()), IDEA, IdeaChanges::default())
            .await
            .expect_err("foreign idea");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_soft_deletes_own_idea() {
        let author = UserId::random();
        let mut mocks = Mocks::new(UserId::random());
        mocks
            .ideas
            .expect_find()
            .return_once(move |_| Ok(Some(idea_by(author))));
        mocks
            .ideas
            .expect_save()
            .withf(|idea| idea.is_deleted())
            .times(1)
            .return_once(|_| Ok(()));

        mocks
            .build()
            .delete(&member(author), IDEA)
            .await
            .expect("deleted");
    }

    #[tokio::test]
    async fn promote_requires_group_admin() {
        let mut mocks = Mocks::new(UserId::random());
        mocks.ideas.expect_save().never();

        let error = mocks
            .build()
            .promote(&member(UserId::random()), GROUP, IDEA)
            .await
            .expect_err("regular user");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn promote_flags_idea() {
        let admin = UserId::random();
        let mut mocks = Mocks::new(admin);
        mocks
            .ideas
            .expect_find()
            .return_once(|_| Ok(Some(idea_by(UserId::random()))));
        mocks
            .ideas
            .expect_save()
            .withf(|idea| idea.is_promoted_to_project && idea.updated_at.is_some())
            .times(1)
            .return_once(|_| Ok(()));
        mocks.ideas.expect_view().return_once(move |_| {
            Ok(Some(IdeaView {
                id: IDEA,
                title: "Faster CI".to_owned(),
                description: "cache builds".to_owned(),
                status: IdeaStatus::Open,
                is_promoted_to_project: true,
                author: UserSummary {
                    user_id: admin,
                    display_name: "Ada".to_owned(),
                    email: "a@x.com".to_owned(),
                },
                group_id: GROUP,
                group_name: "Eng".to_owned(),
                vote_count: 0,
                created_at: fixture_timestamp(),
                updated_at: Some(fixture_timestamp()),
            }))
        });

        let view = mocks
            .build()
            .promote(
                &Actor::new(admin, RoleSet::from([Role::GroupAdmin])),
                GROUP,
                IDEA,
            )
            .await
            .expect("promoted");
        assert!(view.is_promoted_to_project);
    }
}
