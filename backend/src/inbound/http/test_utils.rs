//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::http::header::AUTHORIZATION;

use crate::domain::ports::{
    MockAnalyticsQuery, MockAuthCommand, MockGroupCommand, MockGroupQuery, MockIdeaCommand,
    MockIdeaQuery, MockProjectCommand, MockProjectQuery, MockVoteCommand, MockVoteQuery,
};
use crate::domain::{
    AccessClaims, AccessTokenVerifier, Actor, InvalidToken, Role, RoleSet, UserId,
};

use super::state::{HttpState, HttpStatePorts};

/// Bearer token accepted by [`StubVerifier`].
pub const TEST_TOKEN: &str = "test-access-token";

/// Frontend origin used for confirmation redirects in tests.
pub const TEST_FRONTEND_URL: &str = "http://frontend.test";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// User id carried by [`TEST_TOKEN`].
pub fn test_user_id() -> UserId {
    UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture user id")
}

/// Claims for the test caller holding `roles`.
pub fn test_claims(roles: &[Role]) -> AccessClaims {
    AccessClaims {
        sub: test_user_id().to_string(),
        email: "ada@example.com".to_owned(),
        name: "Ada".to_owned(),
        role: roles.iter().map(|role| role.as_str().to_owned()).collect(),
        iss: "ideahub".to_owned(),
        aud: "ideahub-clients".to_owned(),
        jti: "00000000-0000-0000-0000-000000000001".to_owned(),
        iat: 0,
        exp: i64::MAX,
    }
}

/// Actor matching [`test_claims`].
pub fn test_actor(roles: &[Role]) -> Actor {
    Actor::new(test_user_id(), roles.iter().copied().collect::<RoleSet>())
}

/// `Authorization` header for the test caller.
pub fn bearer() -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
}

/// Verifier accepting only [`TEST_TOKEN`].
pub struct StubVerifier(AccessClaims);

impl AccessTokenVerifier for StubVerifier {
    fn verify(&self, token: &str) -> Result<AccessClaims, InvalidToken> {
        if token == TEST_TOKEN {
            Ok(self.0.clone())
        } else {
            Err(InvalidToken)
        }
    }
}

/// Mock driving ports; tests set expectations on the ones they exercise.
#[derive(Default)]
pub struct TestPorts {
    pub auth: MockAuthCommand,
    pub groups: MockGroupCommand,
    pub groups_query: MockGroupQuery,
    pub ideas: MockIdeaCommand,
    pub ideas_query: MockIdeaQuery,
    pub votes: MockVoteCommand,
    pub votes_query: MockVoteQuery,
    pub projects: MockProjectCommand,
    pub projects_query: MockProjectQuery,
    pub analytics: MockAnalyticsQuery,
}

impl TestPorts {
    /// State whose verifier accepts [`TEST_TOKEN`] for a `RegularUser`.
    pub fn into_state(self) -> HttpState {
        self.into_state_with_roles(&[Role::RegularUser])
    }

    /// State whose verifier accepts [`TEST_TOKEN`] for the given roles.
    pub fn into_state_with_roles(self, roles: &[Role]) -> HttpState {
        let ports = HttpStatePorts {
            auth: Arc::new(self.auth),
            groups: Arc::new(self.groups),
            groups_query: Arc::new(self.groups_query),
            ideas: Arc::new(self.ideas),
            ideas_query: Arc::new(self.ideas_query),
            votes: Arc::new(self.votes),
            votes_query: Arc::new(self.votes_query),
            projects: Arc::new(self.projects),
            projects_query: Arc::new(self.projects_query),
            analytics: Arc::new(self.analytics),
        };
        HttpState::new(
            ports,
            Arc::new(StubVerifier(test_claims(roles))),
            TEST_FRONTEND_URL,
        )
    }
}

/// Initialise a service with the full API, a test session and `state`.
macro_rules! init_api {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .configure(crate::inbound::http::configure),
        )
    };
}
pub(crate) use init_api;
