//! Idea handlers.
//!
//! ```text
//! POST   /api/idea/create-idea   ?groupId          {"title","description"}
//! GET    /api/idea/view-ideas    ?groupId
//! GET    /api/idea/open-idea     ?groupId&ideaId
//! GET    /api/idea/my-ideas
//! POST   /api/idea/promote-idea  ?groupId&ideaId
//! PUT    /api/idea/{ideaId}      {"title"?,"description"?,"status"?}
//! DELETE /api/idea/{ideaId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::CreateIdeaRequest;
use crate::domain::{GroupId, IdeaChanges, IdeaId, IdeaView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::envelope::{Envelope, ok, ok_message};
use crate::inbound::http::schemas::{ErrorEnvelopeSchema, MessageEnvelopeSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_idea_status, parse_optional_title, parse_title,
};

/// New idea payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdeaBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Partial idea update; `status` is `Open` or `Closed`, any case.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIdeaBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl TryFrom<UpdateIdeaBody> for IdeaChanges {
    type Error = crate::domain::Error;

    fn try_from(body: UpdateIdeaBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: parse_optional_title(body.title.as_deref(), FieldName::new("title"))?,
            description: body.description,
            status: body.status.as_deref().map(parse_idea_status).transpose()?,
        })
    }
}

/// `?groupId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GroupScope {
    pub group_id: i64,
}

/// `?groupId&ideaId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct IdeaLocator {
    pub group_id: i64,
    pub idea_id: i64,
}

impl IdeaLocator {
    const fn split(&self) -> (GroupId, IdeaId) {
        (GroupId::new(self.group_id), IdeaId::new(self.idea_id))
    }
}

/// Submit an idea to one of the caller's groups.
#[utoipa::path(
    post,
    path = "/api/idea/create-idea",
    params(GroupScope),
    request_body = CreateIdeaBody,
    responses(
        (status = 200, description = "Idea created", body = Envelope<IdeaView>),
        (status = 400, description = "Invalid title", body = ErrorEnvelopeSchema),
        (status = 403, description = "Caller is not a member", body = ErrorEnvelopeSchema),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["ideas"],
    operation_id = "createIdea"
)]
#[post("/create-idea")]
pub async fn create_idea(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<GroupScope>,
    payload: web::Json<CreateIdeaBody>,
) -> ApiResult<HttpResponse> {
    let CreateIdeaBody { title, description } = payload.into_inner();
    let request = CreateIdeaRequest {
        title: parse_title(&title, FieldName::new("title"))?,
        description,
    };
    let idea = state
        .ideas
        .create(caller.actor(), GroupId::new(params.group_id), request)
        .await?;
    Ok(ok("Idea created successfully", idea))
}

/// Ideas of a group, newest first.
#[utoipa::path(
    get,
    path = "/api/idea/view-ideas",
    params(GroupScope),
    responses(
        (status = 200, description = "Ideas", body = Envelope<Vec<IdeaView>>),
        (status = 403, description = "Caller is not a member", body = ErrorEnvelopeSchema),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["ideas"],
    operation_id = "viewIdeas"
)]
#[get("/view-ideas")]
pub async fn view_ideas(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<GroupScope>,
) -> ApiResult<HttpResponse> {
    let ideas = state
        .ideas_query
        .list_for_group(caller.actor(), GroupId::new(params.group_id))
        .await?;
    Ok(ok("Ideas retrieved successfully", ideas))
}

/// One idea of a group.
#[utoipa::path(
    get,
    path = "/api/idea/open-idea",
    params(IdeaLocator),
    responses(
        (status = 200, description = "Idea", body = Envelope<IdeaView>),
        (status = 403, description = "Caller is not a member", body = ErrorEnvelopeSchema),
        (status = 404, description = "Idea not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["ideas"],
    operation_id = "openIdea"
)]
#[get("/open-idea")]
pub async fn open_idea(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<IdeaLocator>,
) -> ApiResult<HttpResponse> {
    let (group, idea) = params.split();
    let view = state.ideas_query.open(caller.actor(), group, idea).await?;
    Ok(ok("Idea retrieved successfully", view))
}

/// Ideas authored by the caller across all groups.
#[utoipa::path(
    get,
    path = "/api/idea/my-ideas",
    responses(
        (status = 200, description = "Caller's ideas", body = Envelope<Vec<IdeaView>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["ideas"],
    operation_id = "myIdeas"
)]
#[get("/my-ideas")]
pub async fn my_ideas(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let ideas = state.ideas_query.mine(caller.actor()).await?;
    Ok(ok("Your ideas retrieved successfully", ideas))
}

/// Mark an idea as promoted to a project.
#[utoipa::path(
    post,
    path = "/api/idea/promote-idea",
    params(IdeaLocator),
    responses(
        (status = 200, description = "Idea promoted", body = Envelope<IdeaView>),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "Idea not found", body = ErrorEnvelopeSchema),
        (status = 409, description = "Idea already promoted", body = ErrorEnvelopeSchema)
    ),
    tags = ["ideas"],
    operation_id = "promoteIdea"
)]
#[post("/promote-idea")]
pub async fn promote_idea(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<IdeaLocator>,
) -> ApiResult<HttpResponse> {
    let (group, idea) = params.split();
    let view = state.ideas.promote(caller.actor(), group, idea).await?;
    Ok(ok("Idea promoted successfully", view))
}

/// Edit an idea; its author only.
#[utoipa::path(
    put,
    path = "/api/idea/{ideaId}",
    params(("ideaId" = i64, Path, description = "Idea id")),
    request_body = UpdateIdeaBody,
    responses(
        (status = 200, description = "Idea updated", body = Envelope<IdeaView>),
        (status = 400, description = "Invalid title or status", body = ErrorEnvelopeSchema),
        (status = 403, description = "Caller is not the author", body = ErrorEnvelopeSchema),
        (status = 404, description = "Idea not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["ideas"],
    operation_id = "updateIdea"
)]
#[put("/{idea_id}")]
pub async fn update_idea(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
    payload: web::Json<UpdateIdeaBody>,
) -> ApiResult<HttpResponse> {
    let changes = IdeaChanges::try_from(payload.into_inner())?;
    let view = state
        .ideas
        .update(caller.actor(), IdeaId::new(path.into_inner()), changes)
        .await?;
    Ok(ok("Idea updated successfully", view))
}

/// Soft-delete an idea with its votes.
#[utoipa::path(
    delete,
    path = "/api/idea/{ideaId}",
    params(("ideaId" = i64, Path, description = "Idea id")),
    responses(
        (status = 200, description = "Idea deleted", body = MessageEnvelopeSchema),
        (status = 403, description = "Caller may not delete this idea", body = ErrorEnvelopeSchema),
        (status = 404, description = "Idea not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["ideas"],
    operation_id = "deleteIdea"
)]
#[delete("/{idea_id}")]
pub async fn delete_idea(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .ideas
        .delete(caller.actor(), IdeaId::new(path.into_inner()))
        .await?;
    Ok(ok_message("Idea deleted successfully"))
}

/// Routes under `/api/idea`.
pub fn scope() -> actix_web::Scope {
    web::scope("/api/idea")
        .service(create_idea)
        .service(view_ideas)
        .service(open_idea)
        .service(my_ideas)
        .service(promote_idea)
        .service(update_idea)
        .service(delete_idea)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, IdeaStatus, UserSummary};
    use crate::inbound::http::test_utils::{TestPorts, bearer, init_api, test_user_id};
    use crate::test_support::fixture_timestamp;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn view(title: &str, status: IdeaStatus) -> IdeaView {
        IdeaView {
            id: IdeaId::new(11),
            title: title.to_owned(),
            description: String::new(),
            status,
            is_promoted_to_project: false,
            author: UserSummary {
                user_id: test_user_id(),
                display_name: "Ada".to_owned(),
                email: "ada@example.com".to_owned(),
            },
            group_id: GroupId::new(7),
            group_name: "Eng".to_owned(),
            vote_count: 0,
            created_at: fixture_timestamp(),
            updated_at: None,
        }
    }

    #[actix_web::test]
    async fn create_idea_targets_the_query_group() {
        let mut ports = TestPorts::default();
        ports
            .ideas
            .expect_create()
            .withf(|_, group, req| *group == GroupId::new(7) && req.title.as_ref() == "Dark mode")
            .times(1)
            .return_once(|_, _, _| Ok(view("Dark mode", IdeaStatus::Open)));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/idea/create-idea?groupId=7")
                .insert_header(bearer())
                .set_json(json!({"title": "Dark mode", "description": "please"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["status"], "Open");
        assert_eq!(body["data"]["voteCount"], 0);
    }

    #[rstest]
    #[case("closed", IdeaStatus::Closed)]
    #[case("OPEN", IdeaStatus::Open)]
    #[actix_web::test]
    async fn status_updates_are_case_insensitive(
        #[case] raw: &str,
        #[case] expected: IdeaStatus,
    ) {
        let mut ports = TestPorts::default();
        ports
            .ideas
            .expect_update()
            .withf(move |_, idea, changes| {
                *idea == IdeaId::new(11) && changes.status == Some(expected)
            })
            .times(1)
            .return_once(move |_, _, _| Ok(view("Dark mode", expected)));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/idea/11")
                .insert_header(bearer())
                .set_json(json!({"status": raw}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_status_lists_allowed_values() {
        let app = init_api!(TestPorts::default().into_state()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/idea/11")
                .insert_header(bearer())
                .set_json(json!({"status": "Archived"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["errors"],
            json!(["Invalid status value. Allowed values are: Open, Closed"])
        );
    }

    #[actix_web::test]
    async fn my_ideas_is_not_shadowed_by_the_id_route() {
        let mut ports = TestPorts::default();
        ports
            .ideas_query
            .expect_mine()
            .times(1)
            .return_once(|_| Ok(vec![view("Mine", IdeaStatus::Open)]));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/idea/my-ideas")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"][0]["title"], "Mine");
    }

    #[actix_web::test]
    async fn promoting_twice_is_a_conflict() {
        let mut ports = TestPorts::default();
        ports
            .ideas
            .expect_promote()
            .return_once(|_, _, _| Err(Error::conflict("Idea is already promoted")));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/idea/promote-idea?groupId=7&ideaId=11")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn open_idea_needs_both_ids() {
        let app = init_api!(TestPorts::default().into_state()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/idea/open-idea?groupId=7")
                .insert_header(bearer())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn delete_reports_success_without_data() {
        let mut ports = TestPorts::default();
        ports
            .ideas
            .expect_delete()
            .withf(|_, idea| *idea == IdeaId::new(11))
            .return_once(|_, _| Ok(()));
        let app = init_api!(ports.into_state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/idea/11")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], Value::Null);
    }
}
