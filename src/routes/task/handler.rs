use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::utils::{ValidatedJson, ValidatedPath, shape, shape_all};

use super::model::{TaskCreateRequest, TaskResponse};

#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "All tasks", body = [TaskResponse]),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[axum::debug_handler]
pub async fn get_tasks(State(state): State<AppState>) -> AppResult<Json<Vec<TaskResponse>>> {
    let tasks = state
        .database
        .get_all_tasks()
        .await
        .map_err(AppError::collaborator("Failed to fetch tasks"))?;
    Ok(Json(shape_all("TaskResponse", tasks)?))
}

#[utoipa::path(
    post,
    path = "/tasks",
    request_body = TaskCreateRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[axum::debug_handler]
pub async fn create_task(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TaskCreateRequest>,
) -> AppResult<(StatusCode, Json<TaskResponse>)> {
    let task = state
        .database
        .create_task(&req)
        .await
        .map_err(AppError::collaborator("Failed to create task"))?;
    Ok((StatusCode::CREATED, Json(shape("TaskResponse", task)?)))
}

/// Completing an already completed task is a no-op that returns it unchanged.
#[utoipa::path(
    put,
    path = "/tasks/{task_id}/complete",
    params(("task_id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "The completed task", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[axum::debug_handler]
pub async fn complete_task(
    State(state): State<AppState>,
    ValidatedPath(task_id): ValidatedPath<i64>,
) -> AppResult<Json<TaskResponse>> {
    match state.database.complete_task(task_id).await {
        Ok(Some(task)) => Ok(Json(shape("TaskResponse", task)?)),
        Ok(None) => Err(AppError::NotFound("Task not found")),
        Err(e) => Err(AppError::collaborator("Failed to complete task")(e)),
    }
}
