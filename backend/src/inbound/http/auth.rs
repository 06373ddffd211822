//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers declare an [`Authenticated`] argument; extraction validates the
//! `Authorization: Bearer <jwt>` header against the verifier held in
//! [`HttpState`]. Every failure collapses to the same 401 so clients cannot
//! learn why a token was refused.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{AccessClaims, Actor, Error};

use super::ApiResult;
use super::state::HttpState;

const INVALID_TOKEN: &str = "invalid or missing access token";

/// Caller established from a validated access token.
#[derive(Debug, Clone)]
pub struct Authenticated {
    actor: Actor,
    claims: AccessClaims,
}

impl Authenticated {
    /// Identity passed to domain services.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Raw claims, used by the `me` endpoint.
    #[must_use]
    pub const fn claims(&self) -> &AccessClaims {
        &self.claims
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let raw = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub(crate) fn authenticate(req: &HttpRequest) -> ApiResult<Authenticated> {
    let Some(state) = req.app_data::<web::Data<HttpState>>() else {
        return Err(Error::internal("HTTP state is not registered"));
    };
    let Some(token) = bearer_token(req) else {
        debug!("request carried no bearer token");
        return Err(Error::unauthorized(INVALID_TOKEN));
    };
    let claims = state.verifier.verify(token).map_err(|_| {
        debug!("bearer token failed validation");
        Error::unauthorized(INVALID_TOKEN)
    })?;
    let actor = claims.actor().map_err(|_| {
        debug!(sub = %claims.sub, "bearer token subject is not a user id");
        Error::unauthorized(INVALID_TOKEN)
    })?;
    Ok(Authenticated { actor, claims })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TEST_TOKEN, TestPorts, test_user_id};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    async fn call_with(header: Option<&str>) -> actix_web::dev::ServiceResponse {
        let state = TestPorts::default().into_state();
        let app = test::init_service(App::new().app_data(web::Data::new(state)).route(
            "/whoami",
            web::get().to(|caller: Authenticated| async move {
                HttpResponse::Ok().body(caller.actor().user_id().to_string())
            }),
        ))
        .await;
        let mut request = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        test::call_service(&app, request.to_request()).await
    }

    #[actix_web::test]
    async fn valid_bearer_token_yields_actor() {
        let res = call_with(Some(&format!("Bearer {TEST_TOKEN}"))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, test_user_id().to_string());
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer"))]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer not-the-token"))]
    #[actix_web::test]
    async fn rejected_tokens_share_one_message(#[case] header: Option<&str>) {
        let res = call_with(header).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], INVALID_TOKEN);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn scheme_is_case_insensitive() {
        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "bearer abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc"));
    }

    #[actix_web::test]
    async fn test_actor_holds_regular_role() {
        let claims = crate::inbound::http::test_utils::test_claims(&[Role::RegularUser]);
        let actor = claims.actor().expect("valid subject");
        assert!(actor.roles().contains(&Role::RegularUser));
    }
}
