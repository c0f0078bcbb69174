use std::any::Any;

use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;
use crate::error::ErrorResponse;
use crate::middleware::log_errors;
use crate::routes::{agent, content, docs, event, group, insights, member, system, task};

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(event::get_events).post(event::create_event))
        .route("/events/{event_id}", get(event::get_event))
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(member::get_members).post(member::create_member))
        .route("/members/{member_id}/tasks", get(member::get_member_tasks))
}

fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/content/generate-flyer", post(content::generate_flyer))
        .route("/content/generate-social", post(content::generate_social_post))
        .route(
            "/content/generate-welcome",
            post(content::generate_welcome_materials),
        )
}

fn insight_routes() -> Router<AppState> {
    Router::new()
        .route("/insights/dashboard", get(insights::get_dashboard_insights))
        .route("/insights/attendance", get(insights::get_attendance_insights))
        .route("/insights/engagement", get(insights::get_engagement_insights))
}

fn group_routes() -> Router<AppState> {
    Router::new().route("/groups", get(group::get_groups).post(group::create_group))
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(task::get_tasks).post(task::create_task))
        .route("/tasks/{task_id}/complete", put(task::complete_task))
}

fn agent_routes() -> Router<AppState> {
    Router::new().route("/agents/status", get(agent::get_agent_status))
}

/// Last line of defence: a panicking handler still answers with the
/// uniform error body and the server keeps running.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal()),
    )
        .into_response()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(event_routes())
        .merge(member_routes())
        .merge(content_routes())
        .merge(insight_routes())
        .merge(group_routes())
        .merge(task_routes())
        .merge(agent_routes());

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health_check))
        .route("/openapi.json", get(docs::openapi_json))
        .route("/docs", get(docs::swagger_ui))
        .route("/redoc", get(docs::redoc))
        .nest(&state.config.api_base_uri, api)
        .fallback(system::not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
