//! Ideas, votes, promotion and projects through the HTTP surface.

#[macro_use]
mod common;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use common::{Fixtures, authed, harness, login, onboard, send};

/// Ada founds "Eng" and admits Bob; returns `(group id, ada token, bob token)`.
async fn group_with_two_members<S, B>(app: &S, fixtures: &Fixtures) -> (i64, String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (_, ada) = onboard(app, fixtures, "a@x.com", "Ada").await;
    let (_, body) = send(
        app,
        authed(test::TestRequest::post(), "/api/group/create-group", &ada)
            .set_json(json!({"name": "Eng"}))
            .to_request(),
    )
    .await;
    let group_id = body["data"]["id"].as_i64().expect("group id");
    let ada = login(app, "a@x.com").await;

    let (bob_id, bob) = onboard(app, fixtures, "b@x.com", "Bob").await;
    send(
        app,
        authed(
            test::TestRequest::post(),
            &format!("/api/group/join-group?groupId={group_id}"),
            &bob,
        )
        .to_request(),
    )
    .await;
    let (status, _) = send(
        app,
        authed(
            test::TestRequest::post(),
            &format!("/api/group/accept-request?requestUserId={bob_id}&groupId={group_id}"),
            &ada,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (group_id, ada, bob)
}

#[actix_web::test]
async fn votes_can_be_withdrawn_and_recast() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;
    let (group_id, ada, bob) = group_with_two_members(&app, &fixtures).await;

    let (status, body) = send(
        &app,
        authed(
            test::TestRequest::post(),
            &format!("/api/idea/create-idea?groupId={group_id}"),
            &ada,
        )
        .set_json(json!({"title": "Dark mode", "description": "easier on the eyes"}))
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let idea_id = body["data"]["id"].as_i64().expect("idea id");

    let vote_uri = format!("/api/vote/cast-vote?groupId={group_id}&ideaId={idea_id}");
    let (status, body) = send(
        &app,
        authed(test::TestRequest::post(), &vote_uri, &bob).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let vote_id = body["data"]["voteId"].as_i64().expect("vote id");

    let (status, _) = send(
        &app,
        authed(test::TestRequest::post(), &vote_uri, &bob).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        authed(
            test::TestRequest::post(),
            &format!("/api/vote/unvote?voteId={vote_id}"),
            &bob,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        authed(test::TestRequest::post(), &vote_uri, &bob).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["voteId"], vote_id);

    let (status, body) = send(
        &app,
        authed(
            test::TestRequest::get(),
            &format!("/api/idea/open-idea?groupId={group_id}&ideaId={idea_id}"),
            &ada,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["voteCount"], 1);
}

#[actix_web::test]
async fn promoted_ideas_become_projects() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;
    let (group_id, ada, bob) = group_with_two_members(&app, &fixtures).await;

    let (_, body) = send(
        &app,
        authed(
            test::TestRequest::post(),
            &format!("/api/idea/create-idea?groupId={group_id}"),
            &bob,
        )
        .set_json(json!({"title": "Offline mode"}))
        .to_request(),
    )
    .await;
    let idea_id = body["data"]["id"].as_i64().expect("idea id");

    let project_uri = format!("/api/project/create-project?groupId={group_id}&ideaId={idea_id}");
    let project_body = json!({
        "title": "Offline mode",
        "description": "ship it",
        "overseenByEmail": "B@X.com"
    });
    let (status, _) = send(
        &app,
        authed(test::TestRequest::post(), &project_uri, &ada)
            .set_json(&project_body)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "idea is not promoted yet");

    let promote_uri = format!("/api/idea/promote-idea?groupId={group_id}&ideaId={idea_id}");
    let (status, _) = send(
        &app,
        authed(test::TestRequest::post(), &promote_uri, &bob).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        authed(test::TestRequest::post(), &promote_uri, &ada).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isPromotedToProject"], true);

    let (status, body) = send(
        &app,
        authed(test::TestRequest::post(), &project_uri, &ada)
            .set_json(&project_body)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "Planning");
    assert_eq!(body["data"]["overseenByUserName"], "Bob");

    let (status, body) = send(
        &app,
        authed(
            test::TestRequest::get(),
            &format!("/api/project/view-projects?groupId={group_id}"),
            &bob,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        &app,
        authed(test::TestRequest::get(), "/api/analytics/promoted-ideas", &bob).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Offline mode");
}

#[actix_web::test]
async fn outsiders_cannot_read_group_ideas() {
    let (fixtures, state) = harness();
    let app = init_app!(state).await;
    let (group_id, _, _) = group_with_two_members(&app, &fixtures).await;
    let (_, carol) = onboard(&app, &fixtures, "c@x.com", "Carol").await;

    let (status, body) = send(
        &app,
        authed(
            test::TestRequest::get(),
            &format!("/api/idea/view-ideas?groupId={group_id}"),
            &carol,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], serde_json::Value::Null);
}
