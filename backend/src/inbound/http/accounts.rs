//! Account lifecycle handlers.
//!
//! ```text
//! POST /api/auth/register        {"email","password","displayName"}
//! GET  /api/auth/confirm-email   ?userId&token
//! POST /api/auth/resend-email    ?email
//! POST /api/auth/login           {"email","password"}
//! POST /api/auth/refresh-token   {"accessToken","refreshToken"}
//! POST /api/auth/logout          (bearer)
//! GET  /api/auth/me              (bearer)
//! ```

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{ConfirmationOutcome, RefreshRequest};
use crate::domain::{AuthTokens, EmailAddress, LoginCredentials, Registration, UserId, UserSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::envelope::{Envelope, ok, ok_message};
use crate::inbound::http::schemas::{ErrorEnvelopeSchema, MessageEnvelopeSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_login_validation_error, map_registration_error, map_user_validation_error,
    missing_field_error,
};

/// Registration payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Login payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh payload: the (possibly expired) access token and its refresh token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// Query of `confirm-email`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConfirmEmailParams {
    pub user_id: Option<String>,
    pub token: Option<String>,
}

/// Query of `resend-email`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResendEmailParams {
    pub email: Option<String>,
}

/// Claims of the calling user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
}

fn required(value: Option<String>, field: &'static str) -> ApiResult<String> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(FieldName::new(field)))
}

/// Create an account and send its confirmation email.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = Envelope<UserSummary>),
        (status = 400, description = "Invalid request", body = ErrorEnvelopeSchema),
        (status = 409, description = "Email already registered", body = ErrorEnvelopeSchema),
        (status = 500, description = "Confirmation email could not be sent", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        email,
        password,
        display_name,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&email, &display_name, &password)
        .map_err(|err| map_registration_error(&err))?;
    let user = state.auth.register(registration).await?;
    Ok(ok(
        "User registered successfully. Please check your email to confirm your account.",
        user,
    ))
}

/// Confirm an email address and redirect to the frontend.
#[utoipa::path(
    get,
    path = "/api/auth/confirm-email",
    params(ConfirmEmailParams),
    responses(
        (status = 302, description = "Confirmed; redirects to the frontend"),
        (status = 400, description = "Missing parameters or wrong token", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown user", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "confirmEmail",
    security([])
)]
#[get("/confirm-email")]
pub async fn confirm_email(
    state: web::Data<HttpState>,
    params: web::Query<ConfirmEmailParams>,
) -> ApiResult<HttpResponse> {
    let ConfirmEmailParams { user_id, token } = params.into_inner();
    let raw_user_id = required(user_id, "userId")?;
    let token = required(token, "token")?;
    let user_id = UserId::new(&raw_user_id).map_err(|err| map_user_validation_error(&err))?;
    match state.auth.confirm_email(user_id, token).await? {
        ConfirmationOutcome::Confirmed => info!(%user_id, "email confirmed"),
        ConfirmationOutcome::AlreadyConfirmed => info!(%user_id, "email was already confirmed"),
    }
    Ok(HttpResponse::Found()
        .insert_header((LOCATION, state.frontend_url.clone()))
        .finish())
}

/// Issue a fresh confirmation email.
#[utoipa::path(
    post,
    path = "/api/auth/resend-email",
    params(ResendEmailParams),
    responses(
        (status = 200, description = "Confirmation email sent", body = MessageEnvelopeSchema),
        (status = 400, description = "Unknown or already confirmed email", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "resendConfirmationEmail",
    security([])
)]
#[post("/resend-email")]
pub async fn resend_email(
    state: web::Data<HttpState>,
    params: web::Query<ResendEmailParams>,
) -> ApiResult<HttpResponse> {
    let raw = required(params.into_inner().email, "email")?;
    let email = EmailAddress::new(&raw).map_err(|err| map_user_validation_error(&err))?;
    state.auth.resend_confirmation(email).await?;
    Ok(ok_message("Confirmation email sent. Please check your inbox."))
}

/// Verify credentials and issue a token pair.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair", body = Envelope<AuthTokens>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorEnvelopeSchema),
        (status = 401, description = "Invalid credentials or unconfirmed email", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)
        .map_err(|err| map_login_validation_error(&err))?;
    let outcome = state.auth.login(credentials).await?;
    session.persist_user(&outcome.user.user_id)?;
    Ok(ok("Login successful", outcome.tokens))
}

/// Rotate a refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = Envelope<AuthTokens>),
        (status = 400, description = "Missing tokens", body = ErrorEnvelopeSchema),
        (status = 401, description = "Invalid access or refresh token", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "refreshToken",
    security([])
)]
#[post("/refresh-token")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshTokenRequest>,
) -> ApiResult<HttpResponse> {
    let RefreshTokenRequest {
        access_token,
        refresh_token,
    } = payload.into_inner();
    let access_token = required(Some(access_token), "accessToken")?;
    let refresh_token = required(Some(refresh_token), "refreshToken")?;
    let tokens = state
        .auth
        .refresh(RefreshRequest {
            access_token,
            refresh_token,
        })
        .await?;
    Ok(ok("Token refreshed", tokens))
}

/// Revoke every refresh token of the caller and clear the session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageEnvelopeSchema),
        (status = 401, description = "Missing or invalid access token", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    caller: Authenticated,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    state.auth.logout(*caller.actor().user_id()).await?;
    session.purge();
    Ok(ok_message("Logged out successfully"))
}

/// Identity carried by the caller's access token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = Envelope<CurrentUser>),
        (status = 401, description = "Missing or invalid access token", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(caller: Authenticated) -> HttpResponse {
    let claims = caller.claims();
    ok(
        "Current user",
        CurrentUser {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            display_name: claims.name.clone(),
            roles: claims.role.clone(),
        },
    )
}

/// Routes under `/api/auth`.
pub fn scope() -> actix_web::Scope {
    web::scope("/api/auth")
        .service(register)
        .service(confirm_email)
        .service(resend_email)
        .service(login)
        .service(refresh_token)
        .service(logout)
        .service(me)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::LoginOutcome;
    use crate::domain::{Error, Role};
    use crate::inbound::http::test_utils::{
        TEST_FRONTEND_URL, TestPorts, bearer, init_api, test_user_id,
    };
    use crate::test_support::fixture_timestamp;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn summary() -> UserSummary {
        UserSummary {
            user_id: test_user_id(),
            display_name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
        }
    }

    fn tokens() -> AuthTokens {
        AuthTokens {
            access_token: "access".to_owned(),
            refresh_token: "refresh".to_owned(),
            refresh_token_expiry: fixture_timestamp(),
        }
    }

    #[actix_web::test]
    async fn register_wraps_the_summary() {
        let mut ports = TestPorts::default();
        ports
            .auth
            .expect_register()
            .withf(|reg| reg.email.as_ref() == "ada@example.com")
            .times(1)
            .return_once(|_| Ok(summary()));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "email": "Ada@Example.com",
                    "password": "Abc12345!",
                    "displayName": "Ada"
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert_eq!(body["errors"], json!([]));
    }

    #[actix_web::test]
    async fn weak_passwords_list_every_rule() {
        let app = init_api!(TestPorts::default().into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({"email": "a@x.com", "password": "abc", "displayName": "A"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(4));
    }

    #[actix_web::test]
    async fn malformed_json_is_an_envelope() {
        let app = init_api!(TestPorts::default().into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], Value::Null);
    }

    #[actix_web::test]
    async fn login_sets_session_cookie() {
        let mut ports = TestPorts::default();
        ports.auth.expect_login().return_once(|_| {
            Ok(LoginOutcome {
                user: summary(),
                tokens: tokens(),
            })
        });
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({"email": "ada@example.com", "password": "Abc12345!"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.response().cookies().any(|c| c.name() == "session"));
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["accessToken"], "access");
        assert_eq!(body["data"]["refreshToken"], "refresh");
        assert!(body["data"]["refreshTokenExpiry"].is_string());
    }

    #[actix_web::test]
    async fn login_failures_are_unauthorised() {
        let mut ports = TestPorts::default();
        ports
            .auth
            .expect_login()
            .return_once(|_| Err(Error::unauthorized("Invalid credentials")));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({"email": "ada@example.com", "password": "nope"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[rstest]
    #[case("/api/auth/confirm-email?token=abc")]
    #[case("/api/auth/confirm-email?userId=3fa85f64-5717-4562-b3fc-2c963f66afa6&token=")]
    #[actix_web::test]
    async fn confirm_requires_both_params(#[case] uri: &str) {
        let app = init_api!(TestPorts::default().into_state()).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(ConfirmationOutcome::Confirmed)]
    #[case(ConfirmationOutcome::AlreadyConfirmed)]
    #[actix_web::test]
    async fn confirmation_redirects_to_frontend(#[case] outcome: ConfirmationOutcome) {
        let mut ports = TestPorts::default();
        ports
            .auth
            .expect_confirm_email()
            .withf(|user, token| *user == test_user_id() && token == "abc")
            .return_once(move |_, _| Ok(outcome));
        let app = init_api!(ports.into_state()).await;

        let uri = format!("/api/auth/confirm-email?userId={}&token=abc", test_user_id());
        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some(TEST_FRONTEND_URL)
        );
    }

    #[actix_web::test]
    async fn refresh_requires_both_tokens() {
        let app = init_api!(TestPorts::default().into_state()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/refresh-token")
                .set_json(json!({"accessToken": "a"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn logout_requires_a_bearer_token() {
        let app = init_api!(TestPorts::default().into_state()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/auth/logout").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_revokes_for_the_caller() {
        let mut ports = TestPorts::default();
        ports
            .auth
            .expect_logout()
            .withf(|user| *user == test_user_id())
            .times(1)
            .return_once(|_| Ok(()));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/logout")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Logged out successfully");
        assert_eq!(body["data"], Value::Null);
    }

    #[actix_web::test]
    async fn me_echoes_claims() {
        let app =
            init_api!(TestPorts::default().into_state_with_roles(&[Role::RegularUser, Role::GroupAdmin]))
                .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(bearer())
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["displayName"], "Ada");
        assert_eq!(body["data"]["roles"], json!(["RegularUser", "GroupAdmin"]));
    }
}
