use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::utils::{ValidatedJson, ValidatedPath, shape, shape_all};

use super::model::{EventCreateRequest, EventResponse};

#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "All events", body = [EventResponse]),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "events"
)]
#[axum::debug_handler]
pub async fn get_events(State(state): State<AppState>) -> AppResult<Json<Vec<EventResponse>>> {
    let events = state
        .database
        .get_all_events()
        .await
        .map_err(AppError::collaborator("Failed to fetch events"))?;
    Ok(Json(shape_all("EventResponse", events)?))
}

/// Event creation goes through the calendar agent so the event is tracked
/// alongside the other agent workflows.
#[utoipa::path(
    post,
    path = "/events",
    request_body = EventCreateRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "events"
)]
#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<EventCreateRequest>,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    let event = state
        .agents
        .create_event_with_agents(&req)
        .await
        .map_err(AppError::collaborator("Failed to create event"))?;
    Ok((StatusCode::CREATED, Json(shape("EventResponse", event)?)))
}

#[utoipa::path(
    get,
    path = "/events/{event_id}",
    params(("event_id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "The event", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "events"
)]
#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    ValidatedPath(event_id): ValidatedPath<i64>,
) -> AppResult<Json<EventResponse>> {
    match state.database.get_event_by_id(event_id).await {
        Ok(Some(event)) => Ok(Json(shape("EventResponse", event)?)),
        Ok(None) => Err(AppError::NotFound("Event not found")),
        Err(e) => Err(AppError::collaborator("Failed to fetch event")(e)),
    }
}
