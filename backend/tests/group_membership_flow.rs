//! End-to-end join-request workflow through the HTTP surface.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use common::{authed, harness, login, onboard, send};

fn member_ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("member list")
        .iter()
        .filter_map(|member| member["userId"].as_str().map(str::to_owned))
        .collect()
}

#[actix_web::test]
async fn approved_applicant_joins_and_cannot_rejoin() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;

    let (ada_id, ada_token) = onboard(&app, &fixtures, "a@x.com", "Ada").await;
    let (status, body) = send(
        &app,
        authed(test::TestRequest::post(), "/api/group/create-group", &ada_token)
            .set_json(json!({"name": "Eng", "description": "builders"}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let group_id = body["data"]["id"].as_i64().expect("group id");
    assert_eq!(member_ids(&json!({"data": body["data"]["members"]})), vec![ada_id]);

    let (bob_id, bob_token) = onboard(&app, &fixtures, "b@x.com", "Bob").await;
    let join_uri = format!("/api/group/join-group?groupId={group_id}");
    let (status, body) = send(
        &app,
        authed(test::TestRequest::post(), &join_uri, &bob_token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "Pending");

    let accept_uri =
        format!("/api/group/accept-request?requestUserId={bob_id}&groupId={group_id}");

    // Ada's first token predates her GroupAdmin role.
    let (status, _) = send(
        &app,
        authed(test::TestRequest::post(), &accept_uri, &ada_token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let ada_token = login(&app, "a@x.com").await;
    let (status, body) = send(
        &app,
        authed(test::TestRequest::get(), "/api/auth/me", &ada_token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["data"]["roles"]
            .as_array()
            .expect("roles")
            .contains(&json!("GroupAdmin"))
    );

    let (status, body) = send(
        &app,
        authed(
            test::TestRequest::get(),
            &format!("/api/group/view-requests?groupId={group_id}"),
            &ada_token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["requestUserId"], json!(bob_id));

    let (status, body) = send(
        &app,
        authed(test::TestRequest::post(), &accept_uri, &ada_token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "Approved");

    let (status, body) = send(
        &app,
        authed(
            test::TestRequest::get(),
            &format!("/api/group/get-members?groupId={group_id}"),
            &ada_token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(member_ids(&body).contains(&bob_id));

    let (status, body) = send(
        &app,
        authed(test::TestRequest::post(), &join_uri, &bob_token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"], json!(["You are already a member of this group"]));

    // The request is no longer pending.
    let (status, _) = send(
        &app,
        authed(test::TestRequest::post(), &accept_uri, &ada_token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn rejection_creates_no_membership() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;

    onboard(&app, &fixtures, "a@x.com", "Ada").await;
    let ada_token = login(&app, "a@x.com").await;
    let (_, body) = send(
        &app,
        authed(test::TestRequest::post(), "/api/group/create-group", &ada_token)
            .set_json(json!({"name": "Eng"}))
            .to_request(),
    )
    .await;
    let group_id = body["data"]["id"].as_i64().expect("group id");
    let ada_token = login(&app, "a@x.com").await;

    let (bob_id, bob_token) = onboard(&app, &fixtures, "b@x.com", "Bob").await;
    send(
        &app,
        authed(
            test::TestRequest::post(),
            &format!("/api/group/join-group?groupId={group_id}"),
            &bob_token,
        )
        .to_request(),
    )
    .await;

    let (status, body) = send(
        &app,
        authed(
            test::TestRequest::post(),
            &format!("/api/group/reject-request?requestUserId={bob_id}&groupId={group_id}"),
            &ada_token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "Rejected");

    let bob = ideahub::domain::UserId::new(&bob_id).expect("bob id");
    assert_eq!(fixtures.store.memberships_of(&bob), 0);

    let (status, body) = send(
        &app,
        authed(
            test::TestRequest::get(),
            &format!("/api/group/get-members?groupId={group_id}"),
            &bob_token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!member_ids(&body).contains(&bob_id));
}

#[actix_web::test]
async fn group_creators_cannot_found_a_second_group() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;

    let (_, token) = onboard(&app, &fixtures, "a@x.com", "Ada").await;
    let create = |name: &'static str| {
        authed(test::TestRequest::post(), "/api/group/create-group", &token)
            .set_json(json!({"name": name}))
            .to_request()
    };
    let (status, _) = send(&app, create("Eng")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, create("Ops")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}
