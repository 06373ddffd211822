//! Read models for the analytics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{GroupId, IdeaId, IdeaStatus, UserId};

/// Length of every "top N" list.
pub const TOP_N: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdeaVoteCount {
    #[schema(value_type = i64)]
    pub idea_id: IdeaId,
    pub title: String,
    pub vote_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContributorCount {
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub display_name: String,
    pub idea_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotedIdea {
    #[schema(value_type = i64)]
    pub idea_id: IdeaId,
    pub title: String,
    pub group_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdeaStatistics {
    pub total: i64,
    pub open: i64,
    pub closed: i64,
    pub promoted: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupEngagement {
    #[schema(value_type = i64)]
    pub group_id: GroupId,
    pub name: String,
    pub idea_count: i64,
    pub vote_count: i64,
}

impl GroupEngagement {
    /// Ranking key: ideas plus votes.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.idea_count.saturating_add(self.vote_count)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalStats {
    pub ideas_created: i64,
    pub votes_cast: i64,
    /// Projects the user created or oversees.
    pub projects_involved: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_ideas: i64,
    pub open_ideas: i64,
    pub closed_ideas: i64,
    pub promoted_ideas: i64,
    pub total_groups: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentIdea {
    #[schema(value_type = i64)]
    pub idea_id: IdeaId,
    pub title: String,
    pub status: IdeaStatus,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = i64)]
    pub group_id: GroupId,
    pub group_name: String,
}
