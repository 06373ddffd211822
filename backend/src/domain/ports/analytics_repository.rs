//! Port for aggregate read queries.
use async_trait::async_trait;

use crate::domain::{
    ContributorCount, DashboardStats, GroupEngagement, IdeaStatistics, IdeaVoteCount,
    PersonalStats, PromotedIdea, RecentIdea, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by analytics adapters.
    pub enum AnalyticsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "analytics repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "analytics repository query failed: {message}",
    }
}

/// Aggregates over non-deleted rows. `limit` bounds every list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn most_voted(&self, limit: i64) -> Result<Vec<IdeaVoteCount>, AnalyticsRepositoryError>;

    async fn top_contributors(
        &self,
        limit: i64,
    ) -> Result<Vec<ContributorCount>, AnalyticsRepositoryError>;

    async fn promoted_ideas(&self, limit: i64)
    -> Result<Vec<PromotedIdea>, AnalyticsRepositoryError>;

    async fn idea_statistics(&self) -> Result<IdeaStatistics, AnalyticsRepositoryError>;

    /// Active groups ranked by ideas plus votes.
    async fn group_engagement(
        &self,
        limit: i64,
    ) -> Result<Vec<GroupEngagement>, AnalyticsRepositoryError>;

    async fn personal_stats(&self, user: &UserId)
    -> Result<PersonalStats, AnalyticsRepositoryError>;

    async fn dashboard_stats(&self, user: &UserId)
    -> Result<DashboardStats, AnalyticsRepositoryError>;

    async fn recent_activity(
        &self,
        user: &UserId,
        limit: i64,
    ) -> Result<Vec<RecentIdea>, AnalyticsRepositoryError>;
}
