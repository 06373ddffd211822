//! In-memory implementation of every driven repository port.
//!
//! One [`InMemoryStore`] stands in for the whole database so services wired
//! against it observe each other's writes. Invariants the Postgres schema
//! enforces with constraints are checked here explicitly.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AnalyticsRepository, AnalyticsRepositoryError, GroupRepository, GroupRepositoryError,
    IdeaRepository, IdeaRepositoryError, MembershipRepository, MembershipRepositoryError,
    ProjectRepository, ProjectRepositoryError, RefreshTokenRecord, RefreshTokenRepository,
    RefreshTokenRepositoryError, RotationOutcome, UserRepository, UserRepositoryError,
    VoteRepository, VoteRepositoryError,
};
use crate::domain::{
    ContributorCount, DashboardStats, Deletion, EmailAddress, Group, GroupDetails,
    GroupEngagement, GroupId, GroupOverview, Idea, IdeaId, IdeaStatistics, IdeaStatus, IdeaView,
    IdeaVoteCount, MembershipRequest, MembershipRequestId, MembershipStatus, NewGroup, NewIdea,
    NewMembershipRequest, NewProject, NewVote, PendingRequestView, PersonalStats, Project,
    ProjectId, ProjectStatus, ProjectView, PromotedIdea, RecentIdea, Role, SoftDeletable,
    UserAccount, UserId, UserSummary, Vote, VoteId, VoteView,
};

struct StoredToken {
    record: RefreshTokenRecord,
    expired: bool,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, UserAccount>,
    refresh_tokens: Vec<StoredToken>,
    groups: Vec<Group>,
    /// (user, group) rows; a user appears at most once.
    user_groups: Vec<(UserId, GroupId)>,
    requests: Vec<MembershipRequest>,
    ideas: Vec<Idea>,
    votes: Vec<Vote>,
    projects: Vec<Project>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn summary(&self, id: &UserId) -> Option<UserSummary> {
        self.users.get(id).map(UserAccount::summary)
    }

    fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups
            .iter()
            .find(|group| group.id == id && !group.is_deleted())
    }

    fn group_name(&self, id: GroupId) -> String {
        self.group(id)
            .map(|group| group.name.to_string())
            .unwrap_or_default()
    }

    fn group_of(&self, user: &UserId) -> Option<GroupId> {
        self.user_groups
            .iter()
            .find(|(member, _)| member == user)
            .map(|(_, group)| *group)
    }

    fn members(&self, group: GroupId) -> Vec<UserSummary> {
        self.user_groups
            .iter()
            .filter(|(_, joined)| *joined == group)
            .filter_map(|(user, _)| self.summary(user))
            .collect()
    }

    fn live_ideas(&self) -> impl Iterator<Item = &Idea> {
        self.ideas.iter().filter(|idea| !idea.is_deleted())
    }

    fn vote_count(&self, idea: IdeaId) -> i64 {
        let count = self
            .votes
            .iter()
            .filter(|vote| vote.idea_id == idea && !vote.is_deleted())
            .count();
        i64::try_from(count).unwrap_or(i64::MAX)
    }

    fn idea_view(&self, idea: &Idea) -> Option<IdeaView> {
        Some(IdeaView {
            id: idea.id,
            title: idea.title.to_string(),
            description: idea.description.clone(),
            status: idea.status,
            is_promoted_to_project: idea.is_promoted_to_project,
            author: self.summary(&idea.author_id)?,
            group_id: idea.group_id,
            group_name: self.group_name(idea.group_id),
            vote_count: self.vote_count(idea.id),
            created_at: idea.created_at,
            updated_at: idea.updated_at,
        })
    }

    fn project_view(&self, project: &Project) -> Option<ProjectView> {
        let overseer = self.summary(&project.overseen_by)?;
        let idea_title = self
            .ideas
            .iter()
            .find(|idea| idea.id == project.idea_id)
            .map(|idea| idea.title.to_string())
            .unwrap_or_default();
        Some(ProjectView {
            id: project.id,
            title: project.title.to_string(),
            description: project.description.clone(),
            status: project.status,
            created_by_user_id: project.created_by,
            overseen_by_user_id: project.overseen_by,
            overseen_by_user_name: overseer.display_name,
            idea_id: project.idea_id,
            idea_title,
            group_id: project.group_id,
            group_name: self.group_name(project.group_id),
            created_at: project.created_at,
            updated_at: project.updated_at,
        })
    }

    fn newest_first(views: &mut [IdeaView]) {
        views.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
    }
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn take(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

/// Shared in-memory database.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("store mutex"),
        }
    }

    /// Stored account for `email`, including its confirmation state.
    pub fn account(&self, email: &EmailAddress) -> Option<UserAccount> {
        self.lock()
            .users
            .values()
            .find(|user| user.email == *email)
            .cloned()
    }

    /// Number of refresh tokens of `user` that are neither flagged nor
    /// past `now`.
    pub fn active_refresh_tokens(&self, user: &UserId, now: DateTime<Utc>) -> usize {
        self.lock()
            .refresh_tokens
            .iter()
            .filter(|token| {
                token.record.user_id == *user && !token.expired && token.record.expires_at > now
            })
            .count()
    }

    /// Membership rows held by `user`.
    pub fn memberships_of(&self, user: &UserId) -> usize {
        self.lock()
            .user_groups
            .iter()
            .filter(|(member, _)| member == user)
            .count()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserRepositoryError> {
        Ok(self
            .lock()
            .users
            .get(id)
            .filter(|user| !user.is_deleted())
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.email == *email && !user.is_deleted())
            .cloned())
    }

    async fn insert(&self, user: &UserAccount) -> Result<(), UserRepositoryError> {
        let mut state = self.lock();
        if state.users.values().any(|stored| stored.email == user.email) {
            return Err(UserRepositoryError::duplicate_email());
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn remove(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        self.lock().users.remove(id);
        Ok(())
    }

    async fn set_confirmation_token(
        &self,
        id: &UserId,
        token_hash: Option<String>,
    ) -> Result<(), UserRepositoryError> {
        if let Some(user) = self.lock().users.get_mut(id) {
            user.confirmation_token_hash = token_hash;
        }
        Ok(())
    }

    async fn mark_email_confirmed(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        if let Some(user) = self.lock().users.get_mut(id) {
            user.email_confirmed = true;
            user.confirmation_token_hash = None;
        }
        Ok(())
    }

    async fn record_login(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        if let Some(user) = self.lock().users.get_mut(id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn grant_role(&self, id: &UserId, role: Role) -> Result<(), UserRepositoryError> {
        if let Some(user) = self.lock().users.get_mut(id) {
            user.roles.insert(role);
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), RefreshTokenRepositoryError> {
        self.lock().refresh_tokens.push(StoredToken {
            record: record.clone(),
            expired: false,
        });
        Ok(())
    }

    async fn rotate(
        &self,
        user_id: &UserId,
        presented_hash: &str,
        now: DateTime<Utc>,
        replacement: &RefreshTokenRecord,
    ) -> Result<RotationOutcome, RefreshTokenRepositoryError> {
        let mut state = self.lock();
        let Some(matched) = state.refresh_tokens.iter_mut().find(|token| {
            token.record.user_id == *user_id
                && token.record.token_hash == presented_hash
                && !token.expired
                && token.record.expires_at > now
        }) else {
            return Ok(RotationOutcome::NoActiveMatch);
        };
        matched.expired = true;
        state.refresh_tokens.push(StoredToken {
            record: replacement.clone(),
            expired: false,
        });
        Ok(RotationOutcome::Rotated)
    }

    async fn revoke_all(&self, user_id: &UserId) -> Result<u64, RefreshTokenRepositoryError> {
        let mut revoked = 0;
        for token in &mut self.lock().refresh_tokens {
            if token.record.user_id == *user_id && !token.expired {
                token.expired = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn create_with_founder(&self, group: &NewGroup) -> Result<Group, GroupRepositoryError> {
        let mut state = self.lock();
        if state.group_of(&group.created_by).is_some() {
            return Err(GroupRepositoryError::founder_already_member());
        }
        let stored = Group {
            id: GroupId::new(state.next_id()),
            name: group.name.clone(),
            description: group.description.clone(),
            is_active: true,
            created_by: group.created_by,
            created_at: group.created_at,
            deletion: Deletion::live(),
        };
        state.groups.push(stored.clone());
        state.user_groups.push((group.created_by, stored.id));
        if let Some(founder) = state.users.get_mut(&group.created_by) {
            founder.roles.insert(Role::GroupAdmin);
        }
        Ok(stored)
    }

    async fn find(&self, id: GroupId) -> Result<Option<Group>, GroupRepositoryError> {
        Ok(self.lock().group(id).cloned())
    }

    async fn list_overviews(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<GroupOverview>, GroupRepositoryError> {
        let state = self.lock();
        let overviews = state
            .groups
            .iter()
            .filter(|group| group.is_active && !group.is_deleted())
            .map(|group| GroupOverview {
                id: group.id,
                name: group.name.to_string(),
                description: group.description.clone(),
                is_active: group.is_active,
                created_at: group.created_at,
                created_by_user_id: group.created_by,
                created_by: state.summary(&group.created_by),
                is_member: state.group_of(viewer) == Some(group.id),
                has_pending_request: state.requests.iter().any(|request| {
                    request.user_id == *viewer
                        && request.group_id == group.id
                        && request.status == MembershipStatus::Pending
                }),
                member_count: count(state.members(group.id).len()),
                idea_count: count(
                    state
                        .live_ideas()
                        .filter(|idea| idea.group_id == group.id)
                        .count(),
                ),
            })
            .collect();
        Ok(overviews)
    }

    async fn details(&self, id: GroupId) -> Result<Option<GroupDetails>, GroupRepositoryError> {
        let state = self.lock();
        Ok(state.group(id).map(|group| GroupDetails {
            id: group.id,
            name: group.name.to_string(),
            description: group.description.clone(),
            created_by: state.summary(&group.created_by),
            created_at: group.created_at,
            members: state.members(group.id),
        }))
    }

    async fn members(&self, id: GroupId) -> Result<Vec<UserSummary>, GroupRepositoryError> {
        Ok(self.lock().members(id))
    }

    async fn save(&self, group: &Group) -> Result<(), GroupRepositoryError> {
        let mut state = self.lock();
        if let Some(stored) = state.groups.iter_mut().find(|stored| stored.id == group.id) {
            *stored = group.clone();
        }
        Ok(())
    }

    async fn archive(&self, group: &Group) -> Result<(), GroupRepositoryError> {
        let mut state = self.lock();
        if let Some(stored) = state.groups.iter_mut().find(|stored| stored.id == group.id) {
            *stored = group.clone();
        }
        state.user_groups.retain(|(_, joined)| *joined != group.id);
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn group_of(&self, user: &UserId) -> Result<Option<GroupId>, MembershipRepositoryError> {
        Ok(self.lock().group_of(user))
    }

    async fn pending_request(
        &self,
        user: &UserId,
        group: GroupId,
    ) -> Result<Option<MembershipRequest>, MembershipRepositoryError> {
        Ok(self
            .lock()
            .requests
            .iter()
            .find(|request| {
                request.user_id == *user
                    && request.group_id == group
                    && request.status == MembershipStatus::Pending
            })
            .cloned())
    }

    async fn insert_request(
        &self,
        request: &NewMembershipRequest,
    ) -> Result<MembershipRequest, MembershipRepositoryError> {
        let mut state = self.lock();
        let duplicate = state.requests.iter().any(|stored| {
            stored.user_id == request.user_id
                && stored.group_id == request.group_id
                && stored.status == MembershipStatus::Pending
        });
        if duplicate {
            return Err(MembershipRepositoryError::duplicate_pending());
        }
        let stored = MembershipRequest {
            id: MembershipRequestId::new(state.next_id()),
            user_id: request.user_id,
            group_id: request.group_id,
            status: MembershipStatus::Pending,
            requested_at: request.requested_at,
            decided_at: None,
        };
        state.requests.push(stored.clone());
        Ok(stored)
    }

    async fn pending_requests(
        &self,
        group: GroupId,
    ) -> Result<Vec<PendingRequestView>, MembershipRepositoryError> {
        let state = self.lock();
        Ok(state
            .requests
            .iter()
            .filter(|request| {
                request.group_id == group && request.status == MembershipStatus::Pending
            })
            .filter_map(|request| {
                let user = state.summary(&request.user_id)?;
                Some(PendingRequestView {
                    request_id: request.id,
                    request_user_id: request.user_id,
                    display_name: user.display_name,
                    email: user.email,
                    requested_at: request.requested_at,
                })
            })
            .collect())
    }

    async fn record_decision(
        &self,
        request: &MembershipRequest,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut state = self.lock();
        let approving = request.status == MembershipStatus::Approved;
        if approving && state.group_of(&request.user_id).is_some() {
            return Err(MembershipRepositoryError::already_member());
        }
        let Some(stored) = state
            .requests
            .iter_mut()
            .find(|stored| stored.id == request.id && stored.status == MembershipStatus::Pending)
        else {
            return Ok(false);
        };
        stored.status = request.status;
        stored.decided_at = request.decided_at;
        if approving {
            state.user_groups.push((request.user_id, request.group_id));
        }
        Ok(true)
    }

    async fn remove_membership(
        &self,
        user: &UserId,
        group: GroupId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut state = self.lock();
        let before = state.user_groups.len();
        state
            .user_groups
            .retain(|(member, joined)| !(member == user && *joined == group));
        Ok(state.user_groups.len() < before)
    }
}

#[async_trait]
impl IdeaRepository for InMemoryStore {
    async fn insert(&self, idea: &NewIdea) -> Result<Idea, IdeaRepositoryError> {
        let mut state = self.lock();
        let stored = Idea {
            id: IdeaId::new(state.next_id()),
            title: idea.title.clone(),
            description: idea.description.clone(),
            status: IdeaStatus::Open,
            is_promoted_to_project: false,
            author_id: idea.author_id,
            group_id: idea.group_id,
            created_at: idea.created_at,
            updated_at: None,
            deletion: Deletion::live(),
        };
        state.ideas.push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: IdeaId) -> Result<Option<Idea>, IdeaRepositoryError> {
        Ok(self.lock().live_ideas().find(|idea| idea.id == id).cloned())
    }

    async fn save(&self, idea: &Idea) -> Result<(), IdeaRepositoryError> {
        let mut state = self.lock();
        if let Some(stored) = state.ideas.iter_mut().find(|stored| stored.id == idea.id) {
            *stored = idea.clone();
        }
        Ok(())
    }

    async fn view(&self, id: IdeaId) -> Result<Option<IdeaView>, IdeaRepositoryError> {
        let state = self.lock();
        Ok(state
            .live_ideas()
            .find(|idea| idea.id == id)
            .and_then(|idea| state.idea_view(idea)))
    }

    async fn list_for_group(&self, group: GroupId) -> Result<Vec<IdeaView>, IdeaRepositoryError> {
        let state = self.lock();
        let mut views: Vec<IdeaView> = state
            .live_ideas()
            .filter(|idea| idea.group_id == group)
            .filter_map(|idea| state.idea_view(idea))
            .collect();
        State::newest_first(&mut views);
        Ok(views)
    }

    async fn list_for_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<IdeaView>, IdeaRepositoryError> {
        let state = self.lock();
        let mut views: Vec<IdeaView> = state
            .live_ideas()
            .filter(|idea| idea.author_id == *author)
            .filter_map(|idea| state.idea_view(idea))
            .collect();
        State::newest_first(&mut views);
        Ok(views)
    }
}

#[async_trait]
impl VoteRepository for InMemoryStore {
    async fn find(&self, id: VoteId) -> Result<Option<Vote>, VoteRepositoryError> {
        Ok(self
            .lock()
            .votes
            .iter()
            .find(|vote| vote.id == id)
            .cloned())
    }

    async fn find_for(
        &self,
        user: &UserId,
        idea: IdeaId,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        Ok(self
            .lock()
            .votes
            .iter()
            .find(|vote| vote.user_id == *user && vote.idea_id == idea)
            .cloned())
    }

    async fn insert(&self, vote: &NewVote) -> Result<Vote, VoteRepositoryError> {
        let mut state = self.lock();
        if state
            .votes
            .iter()
            .any(|stored| stored.user_id == vote.user_id && stored.idea_id == vote.idea_id)
        {
            return Err(VoteRepositoryError::already_voted());
        }
        let stored = Vote {
            id: VoteId::new(state.next_id()),
            user_id: vote.user_id,
            idea_id: vote.idea_id,
            voted_at: vote.voted_at,
            deletion: Deletion::live(),
        };
        state.votes.push(stored.clone());
        Ok(stored)
    }

    async fn save(&self, vote: &Vote) -> Result<(), VoteRepositoryError> {
        let mut state = self.lock();
        if let Some(stored) = state.votes.iter_mut().find(|stored| stored.id == vote.id) {
            *stored = vote.clone();
        }
        Ok(())
    }

    async fn list_for_idea(&self, idea: IdeaId) -> Result<Vec<VoteView>, VoteRepositoryError> {
        let state = self.lock();
        let mut votes: Vec<&Vote> = state
            .votes
            .iter()
            .filter(|vote| vote.idea_id == idea && !vote.is_deleted())
            .collect();
        votes.sort_by(|a, b| b.voted_at.cmp(&a.voted_at));
        Ok(votes
            .into_iter()
            .filter_map(|vote| {
                let user = state.summary(&vote.user_id)?;
                Some(VoteView {
                    vote_id: vote.id,
                    user_name: user.display_name,
                    user_email: user.email,
                    voted_at: vote.voted_at,
                })
            })
            .collect())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn insert(&self, project: &NewProject) -> Result<Project, ProjectRepositoryError> {
        let mut state = self.lock();
        let stored = Project {
            id: ProjectId::new(state.next_id()),
            title: project.title.clone(),
            description: project.description.clone(),
            status: ProjectStatus::Planning,
            created_by: project.created_by,
            overseen_by: project.overseen_by,
            idea_id: project.idea_id,
            group_id: project.group_id,
            created_at: project.created_at,
            updated_at: None,
            deletion: Deletion::live(),
        };
        state.projects.push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .find(|project| project.id == id && !project.is_deleted())
            .cloned())
    }

    async fn save(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut state = self.lock();
        if let Some(stored) = state
            .projects
            .iter_mut()
            .find(|stored| stored.id == project.id)
        {
            *stored = project.clone();
        }
        Ok(())
    }

    async fn view(&self, id: ProjectId) -> Result<Option<ProjectView>, ProjectRepositoryError> {
        let state = self.lock();
        Ok(state
            .projects
            .iter()
            .find(|project| project.id == id && !project.is_deleted())
            .and_then(|project| state.project_view(project)))
    }

    async fn list_for_group(
        &self,
        group: GroupId,
    ) -> Result<Vec<ProjectView>, ProjectRepositoryError> {
        let state = self.lock();
        Ok(state
            .projects
            .iter()
            .filter(|project| project.group_id == group && !project.is_deleted())
            .filter_map(|project| state.project_view(project))
            .collect())
    }
}

#[async_trait]
impl AnalyticsRepository for InMemoryStore {
    async fn most_voted(
        &self,
        limit: i64,
    ) -> Result<Vec<IdeaVoteCount>, AnalyticsRepositoryError> {
        let state = self.lock();
        let mut ranked: Vec<IdeaVoteCount> = state
            .live_ideas()
            .map(|idea| IdeaVoteCount {
                idea_id: idea.id,
                title: idea.title.to_string(),
                vote_count: state.vote_count(idea.id),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.vote_count
                .cmp(&a.vote_count)
                .then_with(|| a.idea_id.cmp(&b.idea_id))
        });
        ranked.truncate(take(limit));
        Ok(ranked)
    }

    async fn top_contributors(
        &self,
        limit: i64,
    ) -> Result<Vec<ContributorCount>, AnalyticsRepositoryError> {
        let state = self.lock();
        let mut tallies: HashMap<UserId, i64> = HashMap::new();
        for idea in state.live_ideas() {
            *tallies.entry(idea.author_id).or_default() += 1;
        }
        let mut ranked: Vec<ContributorCount> = tallies
            .into_iter()
            .filter_map(|(user_id, idea_count)| {
                Some(ContributorCount {
                    user_id,
                    display_name: state.summary(&user_id)?.display_name,
                    idea_count,
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.idea_count
                .cmp(&a.idea_count)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        ranked.truncate(take(limit));
        Ok(ranked)
    }

    async fn promoted_ideas(
        &self,
        limit: i64,
    ) -> Result<Vec<PromotedIdea>, AnalyticsRepositoryError> {
        let state = self.lock();
        let mut promoted: Vec<&Idea> = state
            .live_ideas()
            .filter(|idea| idea.is_promoted_to_project)
            .collect();
        promoted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(promoted
            .into_iter()
            .take(take(limit))
            .map(|idea| PromotedIdea {
                idea_id: idea.id,
                title: idea.title.to_string(),
                group_name: state.group_name(idea.group_id),
            })
            .collect())
    }

    async fn idea_statistics(&self) -> Result<IdeaStatistics, AnalyticsRepositoryError> {
        let state = self.lock();
        let mut stats = IdeaStatistics::default();
        for idea in state.live_ideas() {
            stats.total += 1;
            match idea.status {
                IdeaStatus::Open => stats.open += 1,
                IdeaStatus::Closed => stats.closed += 1,
            }
            if idea.is_promoted_to_project {
                stats.promoted += 1;
            }
        }
        Ok(stats)
    }

    async fn group_engagement(
        &self,
        limit: i64,
    ) -> Result<Vec<GroupEngagement>, AnalyticsRepositoryError> {
        let state = self.lock();
        let mut ranked: Vec<GroupEngagement> = state
            .groups
            .iter()
            .filter(|group| group.is_active && !group.is_deleted())
            .map(|group| {
                let ideas: Vec<&Idea> = state
                    .live_ideas()
                    .filter(|idea| idea.group_id == group.id)
                    .collect();
                GroupEngagement {
                    group_id: group.id,
                    name: group.name.to_string(),
                    idea_count: count(ideas.len()),
                    vote_count: ideas.iter().map(|idea| state.vote_count(idea.id)).sum(),
                }
            })
            .collect();
        ranked.sort_by_key(|group| std::cmp::Reverse(group.score()));
        ranked.truncate(take(limit));
        Ok(ranked)
    }

    async fn personal_stats(
        &self,
        user: &UserId,
    ) -> Result<PersonalStats, AnalyticsRepositoryError> {
        let state = self.lock();
        Ok(PersonalStats {
            ideas_created: count(
                state
                    .live_ideas()
                    .filter(|idea| idea.author_id == *user)
                    .count(),
            ),
            votes_cast: count(
                state
                    .votes
                    .iter()
                    .filter(|vote| vote.user_id == *user && !vote.is_deleted())
                    .count(),
            ),
            projects_involved: count(
                state
                    .projects
                    .iter()
                    .filter(|project| {
                        !project.is_deleted()
                            && (project.created_by == *user || project.overseen_by == *user)
                    })
                    .count(),
            ),
        })
    }

    async fn dashboard_stats(
        &self,
        user: &UserId,
    ) -> Result<DashboardStats, AnalyticsRepositoryError> {
        let state = self.lock();
        let mut stats = DashboardStats::default();
        for idea in state.live_ideas().filter(|idea| idea.author_id == *user) {
            stats.total_ideas += 1;
            match idea.status {
                IdeaStatus::Open => stats.open_ideas += 1,
                IdeaStatus::Closed => stats.closed_ideas += 1,
            }
            if idea.is_promoted_to_project {
                stats.promoted_ideas += 1;
            }
        }
        stats.total_groups = count(
            state
                .user_groups
                .iter()
                .filter(|(member, _)| member == user)
                .count(),
        );
        Ok(stats)
    }

    async fn recent_activity(
        &self,
        user: &UserId,
        limit: i64,
    ) -> Result<Vec<RecentIdea>, AnalyticsRepositoryError> {
        let state = self.lock();
        let mut mine: Vec<&Idea> = state
            .live_ideas()
            .filter(|idea| idea.author_id == *user)
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(mine
            .into_iter()
            .take(take(limit))
            .map(|idea| RecentIdea {
                idea_id: idea.id,
                title: idea.title.to_string(),
                status: idea.status,
                created_at: idea.created_at,
                group_id: idea.group_id,
                group_name: state.group_name(idea.group_id),
            })
            .collect())
    }
}
