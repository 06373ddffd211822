//! Conversions from driven-port errors into domain errors.
//!
//! Connection failures become `ServiceUnavailable`, query failures become
//! `InternalError` and uniqueness violations become `Conflict` with a
//! client-facing message.

use super::Error;
use super::ports::{
    AnalyticsRepositoryError, EmailSendError, GroupRepositoryError, IdeaRepositoryError,
    MembershipRepositoryError, ProjectRepositoryError, RefreshTokenRepositoryError,
    UserRepositoryError, VoteRepositoryError,
};

pub(crate) const ALREADY_IN_A_GROUP: &str =
    "You are already a member of a group. You must leave your current group before creating a new one.";
pub(crate) const ALREADY_VOTED: &str = "User has already voted";
pub(crate) const DUPLICATE_PENDING: &str =
    "You already have a pending request to join this group";
pub(crate) const EMAIL_TAKEN: &str = "An account with this email already exists";
pub(crate) const APPLICANT_IN_ANOTHER_GROUP: &str =
    "User is already a member of another group. They must leave their current group first.";

fn unavailable(store: &str, message: &str) -> Error {
    Error::service_unavailable(format!("{store} unavailable: {message}"))
}

fn failed(store: &str, message: &str) -> Error {
    Error::internal(format!("{store} error: {message}"))
}

impl From<UserRepositoryError> for Error {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::Connection { message } => unavailable("user repository", &message),
            UserRepositoryError::Query { message } => failed("user repository", &message),
            UserRepositoryError::DuplicateEmail => Self::conflict(EMAIL_TAKEN),
        }
    }
}

impl From<RefreshTokenRepositoryError> for Error {
    fn from(error: RefreshTokenRepositoryError) -> Self {
        match error {
            RefreshTokenRepositoryError::Connection { message } => {
                unavailable("refresh token repository", &message)
            }
            RefreshTokenRepositoryError::Query { message } => {
                failed("refresh token repository", &message)
            }
        }
    }
}

impl From<GroupRepositoryError> for Error {
    fn from(error: GroupRepositoryError) -> Self {
        match error {
            GroupRepositoryError::Connection { message } => {
                unavailable("group repository", &message)
            }
            GroupRepositoryError::Query { message } => failed("group repository", &message),
            GroupRepositoryError::FounderAlreadyMember => Self::conflict(ALREADY_IN_A_GROUP),
        }
    }
}

impl From<MembershipRepositoryError> for Error {
    fn from(error: MembershipRepositoryError) -> Self {
        match error {
            MembershipRepositoryError::Connection { message } => {
                unavailable("membership repository", &message)
            }
            MembershipRepositoryError::Query { message } => {
                failed("membership repository", &message)
            }
            MembershipRepositoryError::AlreadyMember => Self::conflict(APPLICANT_IN_ANOTHER_GROUP),
            MembershipRepositoryError::DuplicatePending => Self::conflict(DUPLICATE_PENDING),
        }
    }
}

impl From<IdeaRepositoryError> for Error {
    fn from(error: IdeaRepositoryError) -> Self {
        match error {
            IdeaRepositoryError::Connection { message } => unavailable("idea repository", &message),
            IdeaRepositoryError::Query { message } => failed("idea repository", &message),
        }
    }
}

impl From<VoteRepositoryError> for Error {
    fn from(error: VoteRepositoryError) -> Self {
        match error {
            VoteRepositoryError::Connection { message } => unavailable("vote repository", &message),
            VoteRepositoryError::Query { message } => failed("vote repository", &message),
            VoteRepositoryError::AlreadyVoted => Self::conflict(ALREADY_VOTED),
        }
    }
}

impl From<ProjectRepositoryError> for Error {
    fn from(error: ProjectRepositoryError) -> Self {
        match error {
            ProjectRepositoryError::Connection { message } => {
                unavailable("project repository", &message)
            }
            ProjectRepositoryError::Query { message } => failed("project repository", &message),
        }
    }
}

impl From<AnalyticsRepositoryError> for Error {
    fn from(error: AnalyticsRepositoryError) -> Self {
        match error {
            AnalyticsRepositoryError::Connection { message } => {
                unavailable("analytics repository", &message)
            }
            AnalyticsRepositoryError::Query { message } => {
                failed("analytics repository", &message)
            }
        }
    }
}

impl From<EmailSendError> for Error {
    fn from(error: EmailSendError) -> Self {
        Self::internal(error.to_string())
    }
}
