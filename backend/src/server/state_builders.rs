//! Wire Diesel repositories and domain services into [`HttpState`].

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use ideahub::domain::ports::{EmailSendError, EmailSender};
use ideahub::domain::{
    AnalyticsService, AuthService, AuthServiceDeps, AuthSettings, GroupService, IdeaService,
    PasswordHasher, ProjectService, ProjectServiceDeps, TokenIssuer, VoteService,
};
use ideahub::inbound::http::state::{HttpState, HttpStatePorts};
use ideahub::outbound::email::{HttpEmailConfig, HttpEmailSender, LoggingEmailSender};
use ideahub::outbound::persistence::{
    DbPool, DieselAnalyticsRepository, DieselGroupRepository, DieselIdeaRepository,
    DieselMembershipRepository, DieselProjectRepository, DieselRefreshTokenRepository,
    DieselUserRepository, DieselVoteRepository,
};

/// Shared collaborators for every service.
pub struct StateInputs {
    pub pool: DbPool,
    pub tokens: Arc<TokenIssuer>,
    pub hasher: Arc<PasswordHasher>,
    pub clock: Arc<dyn Clock>,
    pub mailer: Arc<dyn EmailSender>,
    pub auth: AuthSettings,
    pub frontend_url: String,
}

/// Pick the HTTP mailer when configured, otherwise log messages instead.
///
/// # Errors
/// Fails when the HTTP client cannot be built.
pub fn build_mailer(
    config: Option<HttpEmailConfig>,
) -> Result<Arc<dyn EmailSender>, EmailSendError> {
    match config {
        Some(config) => {
            info!(endpoint = %config.endpoint, "sending email through HTTP API");
            Ok(Arc::new(HttpEmailSender::new(config)?))
        }
        None => {
            warn!("no email API configured; confirmation emails will only be logged");
            Ok(Arc::new(LoggingEmailSender))
        }
    }
}

/// Build every driving port on top of the database pool.
pub fn build_http_state(inputs: StateInputs) -> HttpState {
    let StateInputs {
        pool,
        tokens,
        hasher,
        clock,
        mailer,
        auth,
        frontend_url,
    } = inputs;

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let groups = Arc::new(DieselGroupRepository::new(pool.clone()));
    let memberships = Arc::new(DieselMembershipRepository::new(pool.clone()));
    let ideas = Arc::new(DieselIdeaRepository::new(pool.clone()));
    let votes = Arc::new(DieselVoteRepository::new(pool.clone()));
    let projects = Arc::new(DieselProjectRepository::new(pool.clone()));

    let auth_service = Arc::new(AuthService::new(
        AuthServiceDeps {
            users: users.clone(),
            refresh_tokens: Arc::new(DieselRefreshTokenRepository::new(pool.clone())),
            mailer,
            tokens: tokens.clone(),
            hasher,
            clock: clock.clone(),
        },
        auth,
    ));
    let group_service = Arc::new(GroupService::new(
        groups.clone(),
        memberships.clone(),
        clock.clone(),
    ));
    let idea_service = Arc::new(IdeaService::new(
        ideas.clone(),
        groups.clone(),
        memberships.clone(),
        clock.clone(),
    ));
    let vote_service = Arc::new(VoteService::new(
        votes,
        ideas.clone(),
        groups.clone(),
        memberships.clone(),
        clock.clone(),
    ));
    let project_service = Arc::new(ProjectService::new(
        ProjectServiceDeps {
            projects,
            ideas,
            groups,
            memberships,
            users,
        },
        clock,
    ));
    let analytics = Arc::new(AnalyticsService::new(Arc::new(
        DieselAnalyticsRepository::new(pool),
    )));

    let ports = HttpStatePorts {
        auth: auth_service,
        groups: group_service.clone(),
        groups_query: group_service,
        ideas: idea_service.clone(),
        ideas_query: idea_service,
        votes: vote_service.clone(),
        votes_query: vote_service,
        projects: project_service.clone(),
        projects_query: project_service,
        analytics,
    };
    HttpState::new(ports, tokens, frontend_url)
}
