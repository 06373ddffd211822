//! Port for vote storage.
//!
//! Unlike the other repositories, vote lookups return soft-deleted rows so
//! callers can restore them instead of inserting a duplicate pair.

use async_trait::async_trait;

use crate::domain::{IdeaId, NewVote, UserId, Vote, VoteId, VoteView};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by vote repository adapters.
    pub enum VoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "vote repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "vote repository query failed: {message}",
        /// A row already exists for the (user, idea) pair.
        AlreadyVoted => "user has already voted",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn find(&self, id: VoteId) -> Result<Option<Vote>, VoteRepositoryError>;

    async fn find_for(&self, user: &UserId, idea: IdeaId)
    -> Result<Option<Vote>, VoteRepositoryError>;

    async fn insert(&self, vote: &NewVote) -> Result<Vote, VoteRepositoryError>;

    /// Persist `voted_at` and the soft-delete marker.
    async fn save(&self, vote: &Vote) -> Result<(), VoteRepositoryError>;

    /// Active votes on `idea`, newest first.
    async fn list_for_idea(&self, idea: IdeaId) -> Result<Vec<VoteView>, VoteRepositoryError>;
}
