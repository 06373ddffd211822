//! Dashboard aggregates.
//!
//! Every list is capped at [`TOP_N`]. Personal and dashboard figures are
//! computed for the calling user.

use std::sync::Arc;

use async_trait::async_trait;

use super::ports::{AnalyticsQuery, AnalyticsRepository};
use super::{
    Actor, ContributorCount, DashboardStats, Error, GroupEngagement, IdeaStatistics,
    IdeaVoteCount, PersonalStats, PromotedIdea, RecentIdea, TOP_N,
};

/// Analytics service implementing [`AnalyticsQuery`].
#[derive(Clone)]
pub struct AnalyticsService<A> {
    analytics: Arc<A>,
}

impl<A> AnalyticsService<A> {
    pub const fn new(analytics: Arc<A>) -> Self {
        Self { analytics }
    }
}

#[async_trait]
impl<A> AnalyticsQuery for AnalyticsService<A>
where
    A: AnalyticsRepository,
{
    async fn most_voted(&self) -> Result<Vec<IdeaVoteCount>, Error> {
        Ok(self.analytics.most_voted(TOP_N).await?)
    }

    async fn top_contributors(&self) -> Result<Vec<ContributorCount>, Error> {
        Ok(self.analytics.top_contributors(TOP_N).await?)
    }

    async fn promoted_ideas(&self) -> Result<Vec<PromotedIdea>, Error> {
        Ok(self.analytics.promoted_ideas(TOP_N).await?)
    }

    async fn idea_statistics(&self) -> Result<IdeaStatistics, Error> {
        Ok(self.analytics.idea_statistics().await?)
    }

    async fn group_engagement(&self) -> Result<Vec<GroupEngagement>, Error> {
        let mut groups = self.analytics.group_engagement(TOP_N).await?;
        // Adapters rank already; keep the order stable if one does not.
        groups.sort_by_key(|group| std::cmp::Reverse(group.score()));
        Ok(groups)
    }

    async fn personal_stats(&self, actor: &Actor) -> Result<PersonalStats, Error> {
        Ok(self.analytics.personal_stats(actor.user_id()).await?)
    }

    async fn dashboard_stats(&self, actor: &Actor) -> Result<DashboardStats, Error> {
        Ok(self.analytics.dashboard_stats(actor.user_id()).await?)
    }

    async fn recent_activity(&self, actor: &Actor) -> Result<Vec<RecentIdea>, Error> {
        Ok(self
            .analytics
            .recent_activity(actor.user_id(), TOP_N)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{AnalyticsRepositoryError, MockAnalyticsRepository};
    use crate::domain::{ErrorCode, GroupId, RoleSet, UserId};

    fn engagement(id: i64, ideas: i64, votes: i64) -> GroupEngagement {
        GroupEngagement {
            group_id: GroupId::new(id),
            name: format!("group-{id}"),
            idea_count: ideas,
            vote_count: votes,
        }
    }

    #[tokio::test]
    async fn lists_are_capped_at_top_n() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_most_voted()
            .withf(|limit| *limit == TOP_N)
            .times(1)
            .return_once(|_| Ok(Vec::new()));
        let service = AnalyticsService::new(Arc::new(repo));

        assert!(service.most_voted().await.expect("most voted").is_empty());
    }

    #[tokio::test]
    async fn engagement_is_ranked_by_ideas_plus_votes() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_group_engagement().return_once(|_| {
            Ok(vec![
                engagement(1, 1, 1),
                engagement(2, 4, 3),
                engagement(3, 0, 5),
            ])
        });
        let service = AnalyticsService::new(Arc::new(repo));

        let ranked = service.group_engagement().await.expect("engagement");
        let ids: Vec<i64> = ranked.iter().map(|group| group.group_id.get()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn personal_stats_are_scoped_to_the_caller() {
        let caller = UserId::random();
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_personal_stats()
            .withf(move |user| *user == caller)
            .return_once(|_| {
                Ok(PersonalStats {
                    ideas_created: 2,
                    votes_cast: 1,
                    projects_involved: 0,
                })
            });
        let service = AnalyticsService::new(Arc::new(repo));

        let stats = service
            .personal_stats(&Actor::new(caller, RoleSet::new()))
            .await
            .expect("stats");
        assert_eq!(stats.ideas_created, 2);
    }

    #[tokio::test]
    async fn connection_failures_surface_as_unavailable() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_idea_statistics()
            .return_once(|| Err(AnalyticsRepositoryError::connection("refused")));
        let service = AnalyticsService::new(Arc::new(repo));

        let error = service.idea_statistics().await.expect_err("unavailable");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
