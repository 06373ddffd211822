//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types revalidate
//! stored text so a corrupt row surfaces as a query error rather than a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Nullable, Text, Timestamptz};
use uuid::Uuid;

use crate::domain::{
    Deletion, DisplayName, EmailAddress, Group, GroupId, Idea, IdeaId, IdeaStatus, IdeaView,
    MembershipRequest, MembershipRequestId, MembershipStatus, Project, ProjectId, ProjectStatus,
    ProjectView, Role, RoleSet, Title, UserAccount, UserId, UserSummary, Vote, VoteId,
};

use super::schema::{
    group_membership_requests, groups, ideas, projects, refresh_tokens, user_groups, user_roles,
    users, votes,
};

/// A stored value failed domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {column} is invalid: {reason}")]
pub(crate) struct InvalidRow {
    column: &'static str,
    reason: String,
}

impl InvalidRow {
    fn new(column: &'static str, reason: impl ToString) -> Self {
        Self {
            column,
            reason: reason.to_string(),
        }
    }
}

fn title(column: &'static str, raw: String) -> Result<Title, InvalidRow> {
    Title::new(raw).map_err(|err| InvalidRow::new(column, err))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub confirmation_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserRow {
    /// Combine the account row with its role names.
    pub(crate) fn into_account(self, role_names: &[String]) -> Result<UserAccount, InvalidRow> {
        let roles = role_names
            .iter()
            .map(|name| name.parse::<Role>())
            .collect::<Result<RoleSet, _>>()
            .map_err(|err| InvalidRow::new("user_roles.role", err))?;
        Ok(UserAccount {
            id: UserId::from_uuid(self.id),
            email: EmailAddress::new(&self.email)
                .map_err(|err| InvalidRow::new("users.email", err))?,
            display_name: DisplayName::new(&self.display_name)
                .map_err(|err| InvalidRow::new("users.display_name", err))?,
            password_hash: self.password_hash,
            email_confirmed: self.email_confirmed,
            confirmation_token_hash: self.confirmation_token_hash,
            roles,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
            deletion: Deletion::from_parts(self.is_deleted, self.deleted_at),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
    pub email_confirmed: bool,
    pub confirmation_token_hash: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(user: &'a UserAccount) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            display_name: user.display_name.as_ref(),
            password_hash: &user.password_hash,
            email_confirmed: user.email_confirmed,
            confirmation_token_hash: user.confirmation_token_hash.as_deref(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRoleRow {
    pub user_id: Uuid,
    pub role: String,
}

/// Projection of `users` used for nested summaries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserSummaryRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
}

impl From<UserSummaryRow> for UserSummary {
    fn from(row: UserSummaryRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.id),
            display_name: row.display_name,
            email: row.email,
        }
    }
}

// ---------------------------------------------------------------------------
// Refresh tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub(crate) struct NewRefreshTokenRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Groups and memberships
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<GroupRow> for Group {
    type Error = InvalidRow;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GroupId::new(row.id),
            name: title("groups.name", row.name)?,
            description: row.description,
            is_active: row.is_active,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            deletion: Deletion::from_parts(row.is_deleted, row.deleted_at),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = groups)]
pub(crate) struct NewGroupRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = groups)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GroupUpdate<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub is_active: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Group> for GroupUpdate<'a> {
    fn from(group: &'a Group) -> Self {
        Self {
            name: group.name.as_ref(),
            description: &group.description,
            is_active: group.is_active,
            is_deleted: group.deletion.is_deleted(),
            deleted_at: group.deletion.deleted_at(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_groups)]
pub(crate) struct NewMembershipRow {
    pub user_id: Uuid,
    pub group_id: i64,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = group_membership_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MembershipRequestRow {
    pub id: i64,
    pub user_id: Uuid,
    pub group_id: i64,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<MembershipRequestRow> for MembershipRequest {
    type Error = InvalidRow;

    fn try_from(row: MembershipRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MembershipRequestId::new(row.id),
            user_id: UserId::from_uuid(row.user_id),
            group_id: GroupId::new(row.group_id),
            status: row
                .status
                .parse::<MembershipStatus>()
                .map_err(|err| InvalidRow::new("group_membership_requests.status", err))?,
            requested_at: row.requested_at,
            decided_at: row.decided_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = group_membership_requests)]
pub(crate) struct NewMembershipRequestRow {
    pub user_id: Uuid,
    pub group_id: i64,
    pub status: &'static str,
    pub requested_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ideas and votes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ideas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IdeaRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub is_promoted_to_project: bool,
    pub author_id: Uuid,
    pub group_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<IdeaRow> for Idea {
    type Error = InvalidRow;

    fn try_from(row: IdeaRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: IdeaId::new(row.id),
            title: title("ideas.title", row.title)?,
            description: row.description,
            status: row
                .status
                .parse::<IdeaStatus>()
                .map_err(|err| InvalidRow::new("ideas.status", err))?,
            is_promoted_to_project: row.is_promoted_to_project,
            author_id: UserId::from_uuid(row.author_id),
            group_id: GroupId::new(row.group_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deletion: Deletion::from_parts(row.is_deleted, row.deleted_at),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ideas)]
pub(crate) struct NewIdeaRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'static str,
    pub author_id: Uuid,
    pub group_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = ideas)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct IdeaUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'static str,
    pub is_promoted_to_project: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Idea> for IdeaUpdate<'a> {
    fn from(idea: &'a Idea) -> Self {
        Self {
            title: idea.title.as_ref(),
            description: &idea.description,
            status: idea.status.as_str(),
            is_promoted_to_project: idea.is_promoted_to_project,
            updated_at: idea.updated_at,
            is_deleted: idea.deletion.is_deleted(),
            deleted_at: idea.deletion.deleted_at(),
        }
    }
}

/// Idea joined with its author, group name and live vote count.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct IdeaViewRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub description: String,
    #[diesel(sql_type = Text)]
    pub status: String,
    #[diesel(sql_type = Bool)]
    pub is_promoted_to_project: bool,
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub author_id: Uuid,
    #[diesel(sql_type = Text)]
    pub author_name: String,
    #[diesel(sql_type = Text)]
    pub author_email: String,
    #[diesel(sql_type = BigInt)]
    pub group_id: i64,
    #[diesel(sql_type = Text)]
    pub group_name: String,
    #[diesel(sql_type = BigInt)]
    pub vote_count: i64,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<IdeaViewRow> for IdeaView {
    type Error = InvalidRow;

    fn try_from(row: IdeaViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: IdeaId::new(row.id),
            title: row.title,
            description: row.description,
            status: row
                .status
                .parse::<IdeaStatus>()
                .map_err(|err| InvalidRow::new("ideas.status", err))?,
            is_promoted_to_project: row.is_promoted_to_project,
            author: UserSummary {
                user_id: UserId::from_uuid(row.author_id),
                display_name: row.author_name,
                email: row.author_email,
            },
            group_id: GroupId::new(row.group_id),
            group_name: row.group_name,
            vote_count: row.vote_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoteRow {
    pub id: i64,
    pub user_id: Uuid,
    pub idea_id: i64,
    pub voted_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<VoteRow> for Vote {
    fn from(row: VoteRow) -> Self {
        Self {
            id: VoteId::new(row.id),
            user_id: UserId::from_uuid(row.user_id),
            idea_id: IdeaId::new(row.idea_id),
            voted_at: row.voted_at,
            deletion: Deletion::from_parts(row.is_deleted, row.deleted_at),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = votes)]
pub(crate) struct NewVoteRow {
    pub user_id: Uuid,
    pub idea_id: i64,
    pub voted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = votes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct VoteUpdate {
    pub voted_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Vote> for VoteUpdate {
    fn from(vote: &Vote) -> Self {
        Self {
            voted_at: vote.voted_at,
            is_deleted: vote.deletion.is_deleted(),
            deleted_at: vote.deletion.deleted_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_by: Uuid,
    pub overseen_by: Uuid,
    pub idea_id: i64,
    pub group_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn project_status(raw: &str) -> Result<ProjectStatus, InvalidRow> {
    raw.parse::<ProjectStatus>()
        .map_err(|err| InvalidRow::new("projects.status", err))
}

impl TryFrom<ProjectRow> for Project {
    type Error = InvalidRow;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProjectId::new(row.id),
            title: title("projects.title", row.title)?,
            description: row.description,
            status: project_status(&row.status)?,
            created_by: UserId::from_uuid(row.created_by),
            overseen_by: UserId::from_uuid(row.overseen_by),
            idea_id: IdeaId::new(row.idea_id),
            group_id: GroupId::new(row.group_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deletion: Deletion::from_parts(row.is_deleted, row.deleted_at),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub(crate) struct NewProjectRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'static str,
    pub created_by: Uuid,
    pub overseen_by: Uuid,
    pub idea_id: i64,
    pub group_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProjectUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'static str,
    pub overseen_by: Uuid,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Project> for ProjectUpdate<'a> {
    fn from(project: &'a Project) -> Self {
        Self {
            title: project.title.as_ref(),
            description: &project.description,
            status: project.status.as_str(),
            overseen_by: *project.overseen_by.as_uuid(),
            updated_at: project.updated_at,
            is_deleted: project.deletion.is_deleted(),
            deleted_at: project.deletion.deleted_at(),
        }
    }
}

/// Project joined with its overseer, idea title and group name.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct ProjectViewRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub description: String,
    #[diesel(sql_type = Text)]
    pub status: String,
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub created_by: Uuid,
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub overseen_by: Uuid,
    #[diesel(sql_type = Text)]
    pub overseer_name: String,
    #[diesel(sql_type = BigInt)]
    pub idea_id: i64,
    #[diesel(sql_type = Text)]
    pub idea_title: String,
    #[diesel(sql_type = BigInt)]
    pub group_id: i64,
    #[diesel(sql_type = Text)]
    pub group_name: String,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProjectViewRow> for ProjectView {
    type Error = InvalidRow;

    fn try_from(row: ProjectViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProjectId::new(row.id),
            title: row.title,
            description: row.description,
            status: project_status(&row.status)?,
            created_by_user_id: UserId::from_uuid(row.created_by),
            overseen_by_user_id: UserId::from_uuid(row.overseen_by),
            overseen_by_user_name: row.overseer_name,
            idea_id: IdeaId::new(row.idea_id),
            idea_title: row.idea_title,
            group_id: GroupId::new(row.group_id),
            group_name: row.group_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
