//! Vote handlers.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{GroupId, IdeaId, VoteId, VoteReceipt, VoteView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::envelope::{Envelope, ok, ok_message};
use crate::inbound::http::schemas::{ErrorEnvelopeSchema, MessageEnvelopeSchema};
use crate::inbound::http::state::HttpState;

/// `?groupId&ideaId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VoteTarget {
    pub group_id: i64,
    pub idea_id: i64,
}

/// `?voteId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VoteParams {
    pub vote_id: i64,
}

/// Cast the caller's vote on an open idea.
#[utoipa::path(
    post,
    path = "/api/vote/cast-vote",
    params(VoteTarget),
    responses(
        (status = 200, description = "Vote recorded", body = Envelope<VoteReceipt>),
        (status = 400, description = "Idea is closed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Caller is not a member", body = ErrorEnvelopeSchema),
        (status = 404, description = "Idea not found", body = ErrorEnvelopeSchema),
        (status = 409, description = "Caller already voted", body = ErrorEnvelopeSchema)
    ),
    tags = ["votes"],
    operation_id = "castVote"
)]
#[post("/cast-vote")]
pub async fn cast_vote(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<VoteTarget>,
) -> ApiResult<HttpResponse> {
    let receipt = state
        .votes
        .cast(
            caller.actor(),
            GroupId::new(params.group_id),
            IdeaId::new(params.idea_id),
        )
        .await?;
    Ok(ok("Vote cast successfully", receipt))
}

/// Withdraw one of the caller's votes.
#[utoipa::path(
    post,
    path = "/api/vote/unvote",
    params(VoteParams),
    responses(
        (status = 200, description = "Vote withdrawn", body = MessageEnvelopeSchema),
        (status = 403, description = "Vote belongs to someone else", body = ErrorEnvelopeSchema),
        (status = 404, description = "Vote not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["votes"],
    operation_id = "unvote"
)]
#[post("/unvote")]
pub async fn unvote(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<VoteParams>,
) -> ApiResult<HttpResponse> {
    state
        .votes
        .unvote(caller.actor(), VoteId::new(params.vote_id))
        .await?;
    Ok(ok_message("Vote removed successfully"))
}

/// Votes on an idea, with voter names.
#[utoipa::path(
    get,
    path = "/api/vote/see-votes",
    params(VoteTarget),
    responses(
        (status = 200, description = "Votes", body = Envelope<Vec<VoteView>>),
        (status = 403, description = "Caller is not a member", body = ErrorEnvelopeSchema),
        (status = 404, description = "Idea not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["votes"],
    operation_id = "seeVotes"
)]
#[get("/see-votes")]
pub async fn see_votes(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<VoteTarget>,
) -> ApiResult<HttpResponse> {
    let votes = state
        .votes_query
        .list_for_idea(
            caller.actor(),
            GroupId::new(params.group_id),
            IdeaId::new(params.idea_id),
        )
        .await?;
    Ok(ok("Votes retrieved successfully", votes))
}

/// Routes under `/api/vote`.
pub fn scope() -> actix_web::Scope {
    web::scope("/api/vote")
        .service(cast_vote)
        .service(unvote)
        .service(see_votes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::inbound::http::test_utils::{TestPorts, bearer, init_api};
    use crate::test_support::fixture_timestamp;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    #[actix_web::test]
    async fn cast_returns_the_receipt() {
        let mut ports = TestPorts::default();
        ports
            .votes
            .expect_cast()
            .withf(|_, group, idea| *group == GroupId::new(7) && *idea == IdeaId::new(11))
            .times(1)
            .return_once(|_, _, idea| {
                Ok(VoteReceipt {
                    vote_id: VoteId::new(5),
                    idea_id: idea,
                    voted_at: fixture_timestamp(),
                })
            });
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/vote/cast-vote?groupId=7&ideaId=11")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["voteId"], 5);
    }

    #[rstest]
    #[case(Error::conflict("You have already voted on this idea"), StatusCode::CONFLICT)]
    #[case(Error::invalid_request("Voting is closed for this idea"), StatusCode::BAD_REQUEST)]
    #[case(Error::forbidden("You are not a member of this group"), StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn vote_failures_keep_their_status(#[case] err: Error, #[case] expected: StatusCode) {
        let mut ports = TestPorts::default();
        ports.votes.expect_cast().return_once(move |_, _, _| Err(err));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/vote/cast-vote?groupId=7&ideaId=11")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn unvote_forwards_the_vote_id() {
        let mut ports = TestPorts::default();
        ports
            .votes
            .expect_unvote()
            .withf(|_, vote| *vote == VoteId::new(5))
            .times(1)
            .return_once(|_, _| Ok(()));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/vote/unvote?voteId=5")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn anonymous_callers_cannot_see_votes() {
        let app = init_api!(TestPorts::default().into_state()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/vote/see-votes?groupId=7&ideaId=11")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
