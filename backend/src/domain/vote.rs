//! Votes cast on ideas.
//!
//! A (user, idea) pair owns at most one vote row for its whole life. Un-voting
//! soft-deletes the row and voting again restores it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Deletion, IdeaId, SoftDeletable, UserId, VoteId};

/// Stored vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub user_id: UserId,
    pub idea_id: IdeaId,
    pub voted_at: DateTime<Utc>,
    pub deletion: Deletion,
}

impl SoftDeletable for Vote {
    fn deletion(&self) -> &Deletion {
        &self.deletion
    }

    fn deletion_mut(&mut self) -> &mut Deletion {
        &mut self.deletion
    }
}

/// Vote to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
    pub user_id: UserId,
    pub idea_id: IdeaId,
    pub voted_at: DateTime<Utc>,
}

/// Receipt returned after casting a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    #[schema(value_type = i64)]
    pub vote_id: VoteId,
    #[schema(value_type = i64)]
    pub idea_id: IdeaId,
    pub voted_at: DateTime<Utc>,
}

impl From<&Vote> for VoteReceipt {
    fn from(vote: &Vote) -> Self {
        Self {
            vote_id: vote.id,
            idea_id: vote.idea_id,
            voted_at: vote.voted_at,
        }
    }
}

/// Vote as listed for group admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteView {
    #[schema(value_type = i64)]
    pub vote_id: VoteId,
    pub user_name: String,
    pub user_email: String,
    pub voted_at: DateTime<Utc>,
}
