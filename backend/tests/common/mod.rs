//! Shared wiring for end-to-end HTTP tests.
//!
//! Real domain services run on top of [`InMemoryStore`] and
//! [`RecordingMailer`]; tokens are signed by a real [`TokenIssuer`].

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test;
use chrono::Duration;
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};
use zeroize::Zeroizing;

use ideahub::domain::{
    AnalyticsService, AuthService, AuthServiceDeps, AuthSettings, EmailAddress, GroupService,
    IdeaService, JwtSettings, PasswordHasher, ProjectService, ProjectServiceDeps, TokenIssuer,
    VoteService,
};
use ideahub::inbound::http::state::{HttpState, HttpStatePorts};
use ideahub::test_support::{InMemoryStore, RecordingMailer};

pub const FRONTEND_URL: &str = "http://frontend.test";
pub const PASSWORD: &str = "Abc12345!";

/// Store and mailer shared with the wired state, kept for assertions.
pub struct Fixtures {
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn harness() -> (Fixtures, HttpState) {
    let store = Arc::new(InMemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(
        TokenIssuer::new(
            &JwtSettings {
                secret_hex: Zeroizing::new("0f".repeat(32)),
                issuer: "ideahub".to_owned(),
                audience: "ideahub-clients".to_owned(),
                access_token_ttl: Duration::minutes(15),
            },
            clock.clone(),
        )
        .expect("signing key"),
    );

    let auth = Arc::new(AuthService::new(
        AuthServiceDeps {
            users: store.clone(),
            refresh_tokens: store.clone(),
            mailer: mailer.clone(),
            tokens: tokens.clone(),
            hasher: Arc::new(PasswordHasher::insecure_fast()),
            clock: clock.clone(),
        },
        AuthSettings {
            require_confirmed_email: true,
            public_base_url: "http://api.test".to_owned(),
            refresh_token_ttl: Duration::days(7),
        },
    ));
    let groups = Arc::new(GroupService::new(store.clone(), store.clone(), clock.clone()));
    let ideas = Arc::new(IdeaService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        clock.clone(),
    ));
    let votes = Arc::new(VoteService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        clock.clone(),
    ));
    let projects = Arc::new(ProjectService::new(
        ProjectServiceDeps {
            projects: store.clone(),
            ideas: store.clone(),
            groups: store.clone(),
            memberships: store.clone(),
            users: store.clone(),
        },
        clock,
    ));

    let ports = HttpStatePorts {
        auth,
        groups: groups.clone(),
        groups_query: groups,
        ideas: ideas.clone(),
        ideas_query: ideas,
        votes: votes.clone(),
        votes_query: votes,
        projects: projects.clone(),
        projects_query: projects,
        analytics: Arc::new(AnalyticsService::new(store.clone())),
    };
    (
        Fixtures { store, mailer },
        HttpState::new(ports, tokens, FRONTEND_URL),
    )
}

/// Initialise the full API the way the server binary does.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::generate(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .wrap(ideahub::Trace)
                .configure(ideahub::inbound::http::configure),
        )
    };
}

/// Send `req` and decode the envelope; redirects yield `Value::Null`.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    if status.is_redirection() {
        return (status, Value::Null);
    }
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

pub fn authed(method: test::TestRequest, uri: &str, token: &str) -> test::TestRequest {
    method
        .uri(uri)
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
}

/// Register, confirm through the emailed link and log in; returns
/// `(user id, access token)`.
pub async fn onboard<S, B>(
    app: &S,
    fixtures: &Fixtures,
    email: &str,
    display_name: &str,
) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": email,
                "password": PASSWORD,
                "displayName": display_name,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register: {body}");

    let user_id = fixtures.mailer.last_link_param("userId").expect("userId");
    let token = fixtures.mailer.last_link_param("token").expect("token");
    let (status, _) = send(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/auth/confirm-email?userId={user_id}&token={token}"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);
    let account = fixtures
        .store
        .account(&EmailAddress::new(email).expect("email"))
        .expect("stored account");
    assert!(account.email_confirmed);

    let access = login(app, email).await;
    (user_id, access)
}

pub async fn login<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": email, "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login: {body}");
    body["data"]["accessToken"]
        .as_str()
        .expect("access token")
        .to_owned()
}
