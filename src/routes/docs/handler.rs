use axum::{
    extract::{Json, State},
    response::Html,
};
use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiDocument;

use crate::AppState;
use crate::routes::{agent, content, event, group, insights, member, system, task};

const OPENAPI_PATH: &str = "/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "Ecclesiaflow AI Agents API"),
    paths(system::handler::root, system::handler::health_check),
    tags((name = "system", description = "Service banner and liveness"))
)]
struct ServiceDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        event::handler::get_events,
        event::handler::create_event,
        event::handler::get_event,
        member::handler::get_members,
        member::handler::create_member,
        member::handler::get_member_tasks,
        content::handler::generate_flyer,
        content::handler::generate_social_post,
        content::handler::generate_welcome_materials,
        insights::handler::get_dashboard_insights,
        insights::handler::get_attendance_insights,
        insights::handler::get_engagement_insights,
        group::handler::get_groups,
        group::handler::create_group,
        task::handler::get_tasks,
        task::handler::create_task,
        task::handler::complete_task,
        agent::handler::get_agent_status,
    ),
    tags(
        (name = "events", description = "Church events"),
        (name = "members", description = "Members and onboarding"),
        (name = "content", description = "Generated flyers, posts and welcome material"),
        (name = "insights", description = "Dashboard, attendance and engagement reports"),
        (name = "groups", description = "Ministry groups"),
        (name = "tasks", description = "Follow-up tasks"),
        (name = "agents", description = "Agent activity"),
    )
)]
struct ApiDoc;

/// Full document with every API path under the configured base URI.
pub fn api_document(api_base_uri: &str) -> OpenApiDocument {
    let mut document = ServiceDoc::openapi().nest(api_base_uri, ApiDoc::openapi());
    document.info.version = env!("CARGO_PKG_VERSION").to_string();
    document
}

#[axum::debug_handler]
pub async fn openapi_json(State(state): State<AppState>) -> Json<OpenApiDocument> {
    Json(api_document(&state.config.api_base_uri))
}

pub async fn swagger_ui() -> Html<String> {
    Html(format!(
        r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Ecclesiaflow API docs</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({{ url: "{OPENAPI_PATH}", dom_id: "#swagger-ui" }});
  </script>
</body>
</html>"##
    ))
}

pub async fn redoc() -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Ecclesiaflow API reference</title>
</head>
<body>
  <redoc spec-url="{OPENAPI_PATH}"></redoc>
  <script src="https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js"></script>
</body>
</html>"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_paths_sit_under_the_base_uri() {
        let document = api_document("/api/v1");
        let paths = &document.paths.paths;

        assert!(paths.contains_key("/"));
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/v1/events"));
        assert!(paths.contains_key("/api/v1/events/{event_id}"));
        assert!(paths.contains_key("/api/v1/tasks/{task_id}/complete"));
        assert!(!paths.contains_key("/events"));
    }

    #[test]
    fn response_schemas_are_registered() {
        let document = api_document("/api/v1");
        let schemas = &document
            .components
            .as_ref()
            .expect("components present")
            .schemas;

        for name in ["EventCreateRequest", "MemberResponse", "ErrorResponse", "AgentSystemStatus"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
