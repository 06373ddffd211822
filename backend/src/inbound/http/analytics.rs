//! Read-only analytics for the dashboard.
//!
//! The first five endpoints aggregate over the whole platform; the last three
//! are scoped to the caller.

use actix_web::{HttpResponse, get, web};

use crate::domain::{
    ContributorCount, DashboardStats, GroupEngagement, IdeaStatistics, IdeaVoteCount,
    PersonalStats, PromotedIdea, RecentIdea,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::envelope::{Envelope, ok};
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::state::HttpState;

/// Ideas with the most active votes.
#[utoipa::path(
    get,
    path = "/api/analytics/most-voted",
    responses(
        (status = 200, description = "Top ideas by votes", body = Envelope<Vec<IdeaVoteCount>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "mostVoted"
)]
#[get("/most-voted")]
pub async fn most_voted(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let rows = state.analytics.most_voted().await?;
    Ok(ok("Most voted ideas retrieved successfully", rows))
}

/// Users who authored the most ideas.
#[utoipa::path(
    get,
    path = "/api/analytics/top-contributors",
    responses(
        (status = 200, description = "Top contributors", body = Envelope<Vec<ContributorCount>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "topContributors"
)]
#[get("/top-contributors")]
pub async fn top_contributors(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let rows = state.analytics.top_contributors().await?;
    Ok(ok("Top contributors retrieved successfully", rows))
}

#[utoipa::path(
    get,
    path = "/api/analytics/promoted-ideas",
    responses(
        (status = 200, description = "Promoted ideas", body = Envelope<Vec<PromotedIdea>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "promotedIdeas"
)]
#[get("/promoted-ideas")]
pub async fn promoted_ideas(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let rows = state.analytics.promoted_ideas().await?;
    Ok(ok("Promoted ideas retrieved successfully", rows))
}

/// Idea counts by status.
#[utoipa::path(
    get,
    path = "/api/analytics/idea-statistics",
    responses(
        (status = 200, description = "Idea statistics", body = Envelope<IdeaStatistics>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "ideaStatistics"
)]
#[get("/idea-statistics")]
pub async fn idea_statistics(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let stats = state.analytics.idea_statistics().await?;
    Ok(ok("Idea statistics retrieved successfully", stats))
}

#[utoipa::path(
    get,
    path = "/api/analytics/group-engagement",
    responses(
        (status = 200, description = "Per-group activity", body = Envelope<Vec<GroupEngagement>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "groupEngagement"
)]
#[get("/group-engagement")]
pub async fn group_engagement(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let rows = state.analytics.group_engagement().await?;
    Ok(ok("Group engagement retrieved successfully", rows))
}

/// The caller's own activity.
#[utoipa::path(
    get,
    path = "/api/analytics/personal-stats",
    responses(
        (status = 200, description = "Caller's statistics", body = Envelope<PersonalStats>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "personalStats"
)]
#[get("/personal-stats")]
pub async fn personal_stats(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let stats = state.analytics.personal_stats(caller.actor()).await?;
    Ok(ok("Personal statistics retrieved successfully", stats))
}

/// Idea counts across the caller's groups.
#[utoipa::path(
    get,
    path = "/api/analytics/dashboard-stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = Envelope<DashboardStats>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "dashboardStats"
)]
#[get("/dashboard-stats")]
pub async fn dashboard_stats(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let stats = state.analytics.dashboard_stats(caller.actor()).await?;
    Ok(ok("Dashboard statistics retrieved successfully", stats))
}

/// Latest ideas in the caller's groups.
#[utoipa::path(
    get,
    path = "/api/analytics/recent-activity",
    responses(
        (status = 200, description = "Recent ideas", body = Envelope<Vec<RecentIdea>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "recentActivity"
)]
#[get("/recent-activity")]
pub async fn recent_activity(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let rows = state.analytics.recent_activity(caller.actor()).await?;
    Ok(ok("Recent activity retrieved successfully", rows))
}

/// Routes under `/api/analytics`.
pub fn scope() -> actix_web::Scope {
    web::scope("/api/analytics")
        .service(most_voted)
        .service(top_contributors)
        .service(promoted_ideas)
        .service(idea_statistics)
        .service(group_engagement)
        .service(personal_stats)
        .service(dashboard_stats)
        .service(recent_activity)
}
