//! Refresh-token rotation, replay and logout through the HTTP surface.

#[macro_use]
mod common;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use futures_util::future::join;
use serde_json::{Value, json};

use common::{PASSWORD, authed, harness, onboard, send};

const INVALID_REFRESH: &str = "Invalid access or refresh token";

/// Log in and return the `(access, refresh)` pair.
async fn token_pair<S, B>(app: &S, email: &str) -> (String, String)
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
    tokens_of(&body)
}

fn tokens_of(body: &Value) -> (String, String) {
    let field = |name: &str| {
        body["data"][name]
            .as_str()
            .unwrap_or_else(|| panic!("missing {name} in {body}"))
            .to_owned()
    };
    (field("accessToken"), field("refreshToken"))
}

fn refresh_request(access: &str, refresh: &str) -> Request {
    test::TestRequest::post()
        .uri("/api/auth/refresh-token")
        .set_json(json!({"accessToken": access, "refreshToken": refresh}))
        .to_request()
}

#[actix_web::test]
async fn concurrent_rotations_let_exactly_one_through() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;
    onboard(&app, &fixtures, "a@x.com", "Ada").await;
    let (access, refresh) = token_pair(&app, "a@x.com").await;

    let ((first, first_body), (second, second_body)) = join(
        send(&app, refresh_request(&access, &refresh)),
        send(&app, refresh_request(&access, &refresh)),
    )
    .await;

    let accepted = [first, second]
        .iter()
        .filter(|status| **status == StatusCode::OK)
        .count();
    assert_eq!(accepted, 1, "statuses: {first} {second}");
    assert!([first, second].contains(&StatusCode::UNAUTHORIZED));
    let rejected = if first == StatusCode::OK {
        second_body
    } else {
        first_body
    };
    assert_eq!(rejected["message"], INVALID_REFRESH);
    assert_eq!(rejected["data"], Value::Null);
}

#[actix_web::test]
async fn rotated_tokens_cannot_be_replayed() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;
    onboard(&app, &fixtures, "a@x.com", "Ada").await;
    let (access, refresh) = token_pair(&app, "a@x.com").await;

    let (status, body) = send(&app, refresh_request(&access, &refresh)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (next_access, next_refresh) = tokens_of(&body);
    assert_ne!(next_refresh, refresh);

    let (status, body) = send(&app, refresh_request(&access, &refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], INVALID_REFRESH);

    let (status, _) = send(&app, refresh_request(&next_access, &next_refresh)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn logout_revokes_every_refresh_token() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;
    let (user_id, _) = onboard(&app, &fixtures, "a@x.com", "Ada").await;
    let (access, refresh) = token_pair(&app, "a@x.com").await;

    let (status, _) = send(
        &app,
        authed(test::TestRequest::post(), "/api/auth/logout", &access).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user = ideahub::domain::UserId::new(&user_id).expect("user id");
    assert_eq!(
        fixtures
            .store
            .active_refresh_tokens(&user, chrono::Utc::now()),
        0
    );

    let (status, body) = send(&app, refresh_request(&access, &refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], INVALID_REFRESH);
}
