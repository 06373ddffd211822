//! Group handlers and the join-request workflow.
//!
//! ```text
//! POST   /api/group/create-group    {"name","description"}
//! GET    /api/group/view-groups
//! GET    /api/group/get-members     ?groupId
//! POST   /api/group/join-group      ?groupId
//! GET    /api/group/view-requests   ?groupId
//! POST   /api/group/accept-request  ?requestUserId&groupId
//! POST   /api/group/reject-request  ?requestUserId&groupId
//! POST   /api/group/leave-group     ?groupId
//! GET    /api/group/{groupId}
//! PUT    /api/group/{groupId}       {"name"?,"description"?}
//! DELETE /api/group/{groupId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::CreateGroupRequest;
use crate::domain::{
    Decision, GroupChanges, GroupDetails, GroupId, GroupOverview, MembershipRequest,
    PendingRequestView, UserId, UserSummary,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::envelope::{Envelope, ok, ok_message};
use crate::inbound::http::schemas::{ErrorEnvelopeSchema, MessageEnvelopeSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_user_validation_error, parse_optional_title, parse_title,
};

/// Create-group payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Partial group update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// `?groupId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GroupParams {
    pub group_id: i64,
}

/// `?requestUserId&groupId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DecisionParams {
    pub request_user_id: String,
    pub group_id: i64,
}

impl GroupParams {
    const fn group(&self) -> GroupId {
        GroupId::new(self.group_id)
    }
}

impl TryFrom<UpdateGroupBody> for GroupChanges {
    type Error = crate::domain::Error;

    fn try_from(body: UpdateGroupBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: parse_optional_title(body.name.as_deref(), FieldName::new("name"))?,
            description: body.description,
        })
    }
}

/// Create a group led by the caller.
#[utoipa::path(
    post,
    path = "/api/group/create-group",
    request_body = CreateGroupBody,
    responses(
        (status = 200, description = "Group created", body = Envelope<GroupDetails>),
        (status = 400, description = "Invalid name", body = ErrorEnvelopeSchema),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema),
        (status = 409, description = "Caller already belongs to a group", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "createGroup"
)]
#[post("/create-group")]
pub async fn create_group(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateGroupBody>,
) -> ApiResult<HttpResponse> {
    let CreateGroupBody { name, description } = payload.into_inner();
    let request = CreateGroupRequest {
        name: parse_title(&name, FieldName::new("name"))?,
        description,
    };
    let group = state.groups.create(caller.actor(), request).await?;
    Ok(ok("Group created successfully", group))
}

/// Every active group, annotated for the caller.
#[utoipa::path(
    get,
    path = "/api/group/view-groups",
    responses(
        (status = 200, description = "Groups", body = Envelope<Vec<GroupOverview>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "viewGroups"
)]
#[get("/view-groups")]
pub async fn view_groups(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let groups = state.groups_query.list(caller.actor()).await?;
    Ok(ok("Groups retrieved successfully", groups))
}

/// Members of a group.
#[utoipa::path(
    get,
    path = "/api/group/get-members",
    params(GroupParams),
    responses(
        (status = 200, description = "Members", body = Envelope<Vec<UserSummary>>),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "getMembers"
)]
#[get("/get-members")]
pub async fn get_members(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<GroupParams>,
) -> ApiResult<HttpResponse> {
    let members = state
        .groups_query
        .members(caller.actor(), params.group())
        .await?;
    Ok(ok("Members retrieved successfully", members))
}

/// File a pending join request.
#[utoipa::path(
    post,
    path = "/api/group/join-group",
    params(GroupParams),
    responses(
        (status = 200, description = "Request filed", body = Envelope<MembershipRequest>),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema),
        (status = 409, description = "Already a member or request pending", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "joinGroup"
)]
#[post("/join-group")]
pub async fn join_group(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<GroupParams>,
) -> ApiResult<HttpResponse> {
    let request = state
        .groups
        .request_join(caller.actor(), params.group())
        .await?;
    Ok(ok("Join request sent successfully", request))
}

/// Pending requests; group administrators only.
#[utoipa::path(
    get,
    path = "/api/group/view-requests",
    params(GroupParams),
    responses(
        (status = 200, description = "Pending requests", body = Envelope<Vec<PendingRequestView>>),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "viewRequests"
)]
#[get("/view-requests")]
pub async fn view_requests(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<GroupParams>,
) -> ApiResult<HttpResponse> {
    let requests = state
        .groups_query
        .pending_requests(caller.actor(), params.group())
        .await?;
    Ok(ok("Pending requests retrieved successfully", requests))
}

async fn decide(
    state: &HttpState,
    caller: &Authenticated,
    params: DecisionParams,
    decision: Decision,
) -> ApiResult<MembershipRequest> {
    let applicant =
        UserId::new(&params.request_user_id).map_err(|err| map_user_validation_error(&err))?;
    state
        .groups
        .decide(
            caller.actor(),
            GroupId::new(params.group_id),
            applicant,
            decision,
        )
        .await
}

/// Approve a pending request; the applicant joins the group.
#[utoipa::path(
    post,
    path = "/api/group/accept-request",
    params(DecisionParams),
    responses(
        (status = 200, description = "Request approved", body = Envelope<MembershipRequest>),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "No pending request", body = ErrorEnvelopeSchema),
        (status = 409, description = "Applicant already belongs to a group", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "acceptRequest"
)]
#[post("/accept-request")]
pub async fn accept_request(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<DecisionParams>,
) -> ApiResult<HttpResponse> {
    let request = decide(&state, &caller, params.into_inner(), Decision::Approve).await?;
    Ok(ok("Request accepted successfully", request))
}

/// Reject a pending request.
#[utoipa::path(
    post,
    path = "/api/group/reject-request",
    params(DecisionParams),
    responses(
        (status = 200, description = "Request rejected", body = Envelope<MembershipRequest>),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "No pending request", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "rejectRequest"
)]
#[post("/reject-request")]
pub async fn reject_request(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<DecisionParams>,
) -> ApiResult<HttpResponse> {
    let request = decide(&state, &caller, params.into_inner(), Decision::Reject).await?;
    Ok(ok("Request rejected successfully", request))
}

/// Leave a group.
#[utoipa::path(
    post,
    path = "/api/group/leave-group",
    params(GroupParams),
    responses(
        (status = 200, description = "Left the group", body = MessageEnvelopeSchema),
        (status = 400, description = "Caller is not a member", body = ErrorEnvelopeSchema),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "leaveGroup"
)]
#[post("/leave-group")]
pub async fn leave_group(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<GroupParams>,
) -> ApiResult<HttpResponse> {
    state.groups.leave(caller.actor(), params.group()).await?;
    Ok(ok_message("You have left the group"))
}

/// Group details with its members.
#[utoipa::path(
    get,
    path = "/api/group/{groupId}",
    params(("groupId" = i64, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group", body = Envelope<GroupDetails>),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "getGroup"
)]
#[get("/{group_id}")]
pub async fn get_group(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let group = GroupId::new(path.into_inner());
    let details = state.groups_query.details(caller.actor(), group).await?;
    Ok(ok("Group retrieved successfully", details))
}

/// Edit a group; group administrators only.
#[utoipa::path(
    put,
    path = "/api/group/{groupId}",
    params(("groupId" = i64, Path, description = "Group id")),
    request_body = UpdateGroupBody,
    responses(
        (status = 200, description = "Group updated", body = Envelope<GroupDetails>),
        (status = 400, description = "Invalid name", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "updateGroup"
)]
#[put("/{group_id}")]
pub async fn update_group(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
    payload: web::Json<UpdateGroupBody>,
) -> ApiResult<HttpResponse> {
    let changes = GroupChanges::try_from(payload.into_inner())?;
    let group = GroupId::new(path.into_inner());
    let details = state.groups.update(caller.actor(), group, changes).await?;
    Ok(ok("Group updated successfully", details))
}

/// Soft-delete a group and dissolve its memberships.
#[utoipa::path(
    delete,
    path = "/api/group/{groupId}",
    params(("groupId" = i64, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group deleted", body = MessageEnvelopeSchema),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["groups"],
    operation_id = "deleteGroup"
)]
#[delete("/{group_id}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .groups
        .delete(caller.actor(), GroupId::new(path.into_inner()))
        .await?;
    Ok(ok_message("Group deleted successfully"))
}

/// Routes under `/api/group`. Fixed paths precede `/{groupId}`.
pub fn scope() -> actix_web::Scope {
    web::scope("/api/group")
        .service(create_group)
        .service(view_groups)
        .service(get_members)
        .service(join_group)
        .service(view_requests)
        .service(accept_request)
        .service(reject_request)
        .service(leave_group)
        .service(get_group)
        .service(update_group)
        .service(delete_group)
}
