//! Driving port for casting and withdrawing votes.
use async_trait::async_trait;

use crate::domain::{Actor, Error, GroupId, IdeaId, VoteId, VoteReceipt};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteCommand: Send + Sync {
    /// Vote on an idea, restoring a previously withdrawn vote if present.
    ///
    /// # Errors
    /// `Conflict` when an active vote already exists.
    async fn cast(&self, actor: &Actor, group: GroupId, idea: IdeaId)
    -> Result<VoteReceipt, Error>;

    /// Withdraw one of the caller's votes.
    async fn unvote(&self, actor: &Actor, vote: VoteId) -> Result<(), Error>;
}
