//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::AccessTokenVerifier;
use crate::domain::ports::{
    AnalyticsQuery, AuthCommand, GroupCommand, GroupQuery, IdeaCommand, IdeaQuery, ProjectCommand,
    ProjectQuery, VoteCommand, VoteQuery,
};

/// Parameter object bundling all driving-port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthCommand>,
    pub groups: Arc<dyn GroupCommand>,
    pub groups_query: Arc<dyn GroupQuery>,
    pub ideas: Arc<dyn IdeaCommand>,
    pub ideas_query: Arc<dyn IdeaQuery>,
    pub votes: Arc<dyn VoteCommand>,
    pub votes_query: Arc<dyn VoteQuery>,
    pub projects: Arc<dyn ProjectCommand>,
    pub projects_query: Arc<dyn ProjectQuery>,
    pub analytics: Arc<dyn AnalyticsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthCommand>,
    pub groups: Arc<dyn GroupCommand>,
    pub groups_query: Arc<dyn GroupQuery>,
    pub ideas: Arc<dyn IdeaCommand>,
    pub ideas_query: Arc<dyn IdeaQuery>,
    pub votes: Arc<dyn VoteCommand>,
    pub votes_query: Arc<dyn VoteQuery>,
    pub projects: Arc<dyn ProjectCommand>,
    pub projects_query: Arc<dyn ProjectQuery>,
    pub analytics: Arc<dyn AnalyticsQuery>,
    /// Validates bearer tokens for [`Authenticated`](super::auth::Authenticated).
    pub verifier: Arc<dyn AccessTokenVerifier>,
    /// Redirect target after email confirmation.
    pub frontend_url: String,
}

impl HttpState {
    /// Construct state from the ports bundle, token verifier and frontend
    /// origin.
    pub fn new(
        ports: HttpStatePorts,
        verifier: Arc<dyn AccessTokenVerifier>,
        frontend_url: impl Into<String>,
    ) -> Self {
        let HttpStatePorts {
            auth,
            groups,
            groups_query,
            ideas,
            ideas_query,
            votes,
            votes_query,
            projects,
            projects_query,
            analytics,
        } = ports;
        Self {
            auth,
            groups,
            groups_query,
            ideas,
            ideas_query,
            votes,
            votes_query,
            projects,
            projects_query,
            analytics,
            verifier,
            frontend_url: frontend_url.into(),
        }
    }
}
