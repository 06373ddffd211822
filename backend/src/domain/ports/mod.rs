//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, `AuthCommand`) are consumed by the
//! HTTP adapter. Driven ports (`*Repository`, `EmailSender`) are implemented
//! by the outbound adapters and by the in-memory test store.

mod macros;
pub(crate) use macros::define_port_error;

mod analytics_query;
mod analytics_repository;
mod auth_command;
mod email_sender;
mod group_command;
mod group_query;
mod group_repository;
mod idea_command;
mod idea_query;
mod idea_repository;
mod membership_repository;
mod project_command;
mod project_query;
mod project_repository;
mod refresh_token_repository;
mod user_repository;
mod vote_command;
mod vote_query;
mod vote_repository;

pub use analytics_query::AnalyticsQuery;
#[cfg(test)]
pub use analytics_query::MockAnalyticsQuery;
#[cfg(test)]
pub use analytics_repository::MockAnalyticsRepository;
pub use analytics_repository::{AnalyticsRepository, AnalyticsRepositoryError};
#[cfg(test)]
pub use auth_command::MockAuthCommand;
pub use auth_command::{AuthCommand, ConfirmationOutcome, LoginOutcome, RefreshRequest};
#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailMessage, EmailSendError, EmailSender};
#[cfg(test)]
pub use group_command::MockGroupCommand;
pub use group_command::{CreateGroupRequest, GroupCommand};
pub use group_query::GroupQuery;
#[cfg(test)]
pub use group_query::MockGroupQuery;
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupRepository, GroupRepositoryError};
#[cfg(test)]
pub use idea_command::MockIdeaCommand;
pub use idea_command::{CreateIdeaRequest, IdeaCommand};
pub use idea_query::IdeaQuery;
#[cfg(test)]
pub use idea_query::MockIdeaQuery;
#[cfg(test)]
pub use idea_repository::MockIdeaRepository;
pub use idea_repository::{IdeaRepository, IdeaRepositoryError};
#[cfg(test)]
pub use membership_repository::MockMembershipRepository;
pub use membership_repository::{MembershipRepository, MembershipRepositoryError};
#[cfg(test)]
pub use project_command::MockProjectCommand;
pub use project_command::{CreateProjectRequest, ProjectCommand, UpdateProjectRequest};
#[cfg(test)]
pub use project_query::MockProjectQuery;
pub use project_query::ProjectQuery;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectRepository, ProjectRepositoryError};
#[cfg(test)]
pub use refresh_token_repository::MockRefreshTokenRepository;
pub use refresh_token_repository::{
    RefreshTokenRecord, RefreshTokenRepository, RefreshTokenRepositoryError, RotationOutcome,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use vote_command::MockVoteCommand;
pub use vote_command::VoteCommand;
#[cfg(test)]
pub use vote_query::MockVoteQuery;
pub use vote_query::VoteQuery;
#[cfg(test)]
pub use vote_repository::MockVoteRepository;
pub use vote_repository::{VoteRepository, VoteRepositoryError};
