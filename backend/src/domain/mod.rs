//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities used by the HTTP and
//! persistence adapters, the ports they meet at, and the services that
//! implement the driving ports. Nothing in here knows about Actix or Diesel.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: failure payload and stable identifier.
//! - Value types (`UserId`, `EmailAddress`, `Title`, ids) with validating
//!   constructors.
//! - Services (`AuthService`, `GroupService`, ...) wired by the server.

pub(crate) mod access;
pub mod analytics;
pub mod analytics_service;
pub mod auth;
pub mod auth_service;
pub mod error;
pub mod group;
pub mod group_service;
pub mod idea;
pub mod idea_service;
pub mod ids;
pub mod password;
mod port_errors;
pub mod ports;
pub mod project;
pub mod project_service;
pub mod refresh_ledger;
pub mod roles;
pub mod secrets;
pub mod seed;
pub mod soft_delete;
pub mod title;
pub mod token_issuer;
pub mod trace_id;
pub mod user;
pub mod vote;
pub mod vote_service;

pub use self::analytics::{
    ContributorCount, DashboardStats, GroupEngagement, IdeaStatistics, IdeaVoteCount,
    PersonalStats, PromotedIdea, RecentIdea, TOP_N,
};
pub use self::analytics_service::AnalyticsService;
pub use self::auth::{
    AuthTokens, LoginCredentials, LoginValidationError, NewPassword, PASSWORD_MIN,
    PasswordPolicyError, Registration, RegistrationValidationError,
};
pub use self::auth_service::{AuthService, AuthServiceDeps, AuthSettings};
pub use self::error::{Error, ErrorCode};
pub use self::group::{
    AlreadyDecided, Decision, Group, GroupChanges, GroupDetails, GroupOverview,
    MembershipRequest, MembershipStatus, NewGroup, NewMembershipRequest, PendingRequestView,
    UnknownMembershipStatus,
};
pub use self::group_service::GroupService;
pub use self::idea::{Idea, IdeaChanges, IdeaStatus, IdeaView, InvalidIdeaStatus, NewIdea};
pub use self::idea_service::IdeaService;
pub use self::ids::{GroupId, IdeaId, MembershipRequestId, ProjectId, VoteId};
pub use self::password::PasswordHasher;
pub use self::project::{
    InvalidProjectStatus, NewProject, Project, ProjectChanges, ProjectStatus, ProjectView,
};
pub use self::project_service::{ProjectService, ProjectServiceDeps};
pub use self::refresh_ledger::{IssuedRefreshToken, RefreshTokenLedger};
pub use self::roles::{Actor, Policy, Role, RoleSet, UnknownRole};
pub use self::seed::{AdminSeed, SeedOutcome, seed_super_admin};
pub use self::soft_delete::{Deletion, SoftDeletable};
pub use self::title::{TITLE_MAX, Title, TitleError};
pub use self::token_issuer::{
    AccessClaims, AccessTokenVerifier, InvalidToken, IssuedAccessToken, JwtSettings,
    SigningKeyError, TokenIssuer,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    DisplayName, EmailAddress, UserAccount, UserId, UserSummary, UserValidationError,
};
pub use self::vote::{NewVote, Vote, VoteReceipt, VoteView};
pub use self::vote_service::VoteService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use ideahub::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
