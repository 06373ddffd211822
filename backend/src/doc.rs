//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api` handler plus the health probes, the
//! response envelope schemas and the bearer-token security scheme. The
//! document backs Swagger UI (debug builds) and `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{ErrorEnvelopeSchema, MessageEnvelopeSchema};
use crate::inbound::http::{accounts, analytics, groups, health, ideas, projects, votes};

/// Enrich the generated document with the bearer JWT security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "IdeaHub API",
        description = "Groups, ideas, votes and projects behind bearer-token authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        accounts::register,
        accounts::confirm_email,
        accounts::resend_email,
        accounts::login,
        accounts::refresh_token,
        accounts::logout,
        accounts::me,
        groups::create_group,
        groups::view_groups,
        groups::get_members,
        groups::join_group,
        groups::view_requests,
        groups::accept_request,
        groups::reject_request,
        groups::leave_group,
        groups::get_group,
        groups::update_group,
        groups::delete_group,
        ideas::create_idea,
        ideas::view_ideas,
        ideas::open_idea,
        ideas::my_ideas,
        ideas::promote_idea,
        ideas::update_idea,
        ideas::delete_idea,
        votes::cast_vote,
        votes::unvote,
        votes::see_votes,
        projects::create_project,
        projects::view_projects,
        projects::open_project,
        projects::update_project,
        projects::delete_project,
        analytics::most_voted,
        analytics::top_contributors,
        analytics::promoted_ideas,
        analytics::idea_statistics,
        analytics::group_engagement,
        analytics::personal_stats,
        analytics::dashboard_stats,
        analytics::recent_activity,
        health::ready,
        health::live,
    ),
    components(schemas(ErrorEnvelopeSchema, MessageEnvelopeSchema)),
    tags(
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "groups", description = "Groups and join requests"),
        (name = "ideas", description = "Ideas submitted to groups"),
        (name = "votes", description = "Votes on ideas"),
        (name = "projects", description = "Projects created from promoted ideas"),
        (name = "analytics", description = "Dashboard statistics"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_envelope_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let envelope = schemas.get("ErrorEnvelope").expect("ErrorEnvelope schema");
        for field in ["success", "message", "data", "errors"] {
            assert_object_schema_has_field(envelope, field);
        }
    }

    #[rstest]
    #[case("/api/auth/login")]
    #[case("/api/group/{groupId}")]
    #[case("/api/idea/promote-idea")]
    #[case("/api/vote/cast-vote")]
    #[case("/api/project/create-project")]
    #[case("/api/analytics/recent-activity")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn bearer_scheme_is_declared() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
