//! Project handlers.
//!
//! ```text
//! POST   /api/project/create-project  ?groupId&ideaId    {"title","description","overseenByEmail"}
//! GET    /api/project/view-projects   ?groupId
//! GET    /api/project/open-project    ?groupId&projectId
//! PUT    /api/project/{projectId}     {"title"?,"description"?,"overseenByEmail"?,"status"?}
//! DELETE /api/project/{projectId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateProjectRequest, UpdateProjectRequest};
use crate::domain::{EmailAddress, Error, GroupId, IdeaId, ProjectId, ProjectView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::envelope::{Envelope, ok, ok_message};
use crate::inbound::http::schemas::{ErrorEnvelopeSchema, MessageEnvelopeSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_user_validation_error, parse_optional_title, parse_project_status,
    parse_title,
};

/// New project payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Email of the registered user who will oversee the project.
    pub overseen_by_email: String,
}

/// Partial project update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub overseen_by_email: Option<String>,
    /// `Planning`, `Active`, `Completed`, `Shelved` or `Cancelled`, any case.
    pub status: Option<String>,
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| map_user_validation_error(&err))
}

impl TryFrom<CreateProjectBody> for CreateProjectRequest {
    type Error = Error;

    fn try_from(body: CreateProjectBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: parse_title(&body.title, FieldName::new("title"))?,
            description: body.description,
            overseen_by_email: parse_email(&body.overseen_by_email)?,
        })
    }
}

impl TryFrom<UpdateProjectBody> for UpdateProjectRequest {
    type Error = Error;

    fn try_from(body: UpdateProjectBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: parse_optional_title(body.title.as_deref(), FieldName::new("title"))?,
            description: body.description,
            overseen_by_email: body.overseen_by_email.as_deref().map(parse_email).transpose()?,
            status: body
                .status
                .as_deref()
                .map(parse_project_status)
                .transpose()?,
        })
    }
}

/// `?groupId&ideaId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PromotionSource {
    pub group_id: i64,
    pub idea_id: i64,
}

/// `?groupId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProjectGroup {
    pub group_id: i64,
}

/// `?groupId&projectId`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProjectLocator {
    pub group_id: i64,
    pub project_id: i64,
}

/// Turn a promoted idea into a project.
#[utoipa::path(
    post,
    path = "/api/project/create-project",
    params(PromotionSource),
    request_body = CreateProjectBody,
    responses(
        (status = 200, description = "Project created", body = Envelope<ProjectView>),
        (status = 400, description = "Invalid payload or idea not promoted", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "Idea or overseer not found", body = ErrorEnvelopeSchema),
        (status = 409, description = "Idea already has a project", body = ErrorEnvelopeSchema)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/create-project")]
pub async fn create_project(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<PromotionSource>,
    payload: web::Json<CreateProjectBody>,
) -> ApiResult<HttpResponse> {
    let request = CreateProjectRequest::try_from(payload.into_inner())?;
    let project = state
        .projects
        .create(
            caller.actor(),
            GroupId::new(params.group_id),
            IdeaId::new(params.idea_id),
            request,
        )
        .await?;
    Ok(ok("Project created successfully", project))
}

/// Projects of a group.
#[utoipa::path(
    get,
    path = "/api/project/view-projects",
    params(ProjectGroup),
    responses(
        (status = 200, description = "Projects", body = Envelope<Vec<ProjectView>>),
        (status = 403, description = "Caller is not a member", body = ErrorEnvelopeSchema),
        (status = 404, description = "Group not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["projects"],
    operation_id = "viewProjects"
)]
#[get("/view-projects")]
pub async fn view_projects(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<ProjectGroup>,
) -> ApiResult<HttpResponse> {
    let projects = state
        .projects_query
        .list_for_group(caller.actor(), GroupId::new(params.group_id))
        .await?;
    Ok(ok("Projects retrieved successfully", projects))
}

/// One project of a group.
#[utoipa::path(
    get,
    path = "/api/project/open-project",
    params(ProjectLocator),
    responses(
        (status = 200, description = "Project", body = Envelope<ProjectView>),
        (status = 403, description = "Caller is not a member", body = ErrorEnvelopeSchema),
        (status = 404, description = "Project not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["projects"],
    operation_id = "openProject"
)]
#[get("/open-project")]
pub async fn open_project(
    state: web::Data<HttpState>,
    caller: Authenticated,
    params: web::Query<ProjectLocator>,
) -> ApiResult<HttpResponse> {
    let project = state
        .projects_query
        .open(
            caller.actor(),
            GroupId::new(params.group_id),
            ProjectId::new(params.project_id),
        )
        .await?;
    Ok(ok("Project retrieved successfully", project))
}

/// Edit a project; group administrators only.
#[utoipa::path(
    put,
    path = "/api/project/{projectId}",
    params(("projectId" = i64, Path, description = "Project id")),
    request_body = UpdateProjectBody,
    responses(
        (status = 200, description = "Project updated", body = Envelope<ProjectView>),
        (status = 400, description = "Invalid payload", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "Project or overseer not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[put("/{project_id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
    payload: web::Json<UpdateProjectBody>,
) -> ApiResult<HttpResponse> {
    let request = UpdateProjectRequest::try_from(payload.into_inner())?;
    let project = state
        .projects
        .update(caller.actor(), ProjectId::new(path.into_inner()), request)
        .await?;
    Ok(ok("Project updated successfully", project))
}

/// Soft-delete a project.
#[utoipa::path(
    delete,
    path = "/api/project/{projectId}",
    params(("projectId" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted", body = MessageEnvelopeSchema),
        (status = 403, description = "Not an administrator of this group", body = ErrorEnvelopeSchema),
        (status = 404, description = "Project not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/{project_id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .projects
        .delete(caller.actor(), ProjectId::new(path.into_inner()))
        .await?;
    Ok(ok_message("Project deleted successfully"))
}

/// Routes under `/api/project`.
pub fn scope() -> actix_web::Scope {
    web::scope("/api/project")
        .service(create_project)
        .service(view_projects)
        .service(open_project)
        .service(update_project)
        .service(delete_project)
}
