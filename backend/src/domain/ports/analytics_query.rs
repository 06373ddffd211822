//! Driving port for the analytics dashboard.
use async_trait::async_trait;

use crate::domain::{
    Actor, ContributorCount, DashboardStats, Error, GroupEngagement, IdeaStatistics,
    IdeaVoteCount, PersonalStats, PromotedIdea, RecentIdea,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsQuery: Send + Sync {
    async fn most_voted(&self) -> Result<Vec<IdeaVoteCount>, Error>;

    async fn top_contributors(&self) -> Result<Vec<ContributorCount>, Error>;

    async fn promoted_ideas(&self) -> Result<Vec<PromotedIdea>, Error>;

    async fn idea_statistics(&self) -> Result<IdeaStatistics, Error>;

    async fn group_engagement(&self) -> Result<Vec<GroupEngagement>, Error>;

    async fn personal_stats(&self, actor: &Actor) -> Result<PersonalStats, Error>;

    async fn dashboard_stats(&self, actor: &Actor) -> Result<DashboardStats, Error>;

    async fn recent_activity(&self, actor: &Actor) -> Result<Vec<RecentIdea>, Error>;
}
