use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::routes::task::TaskResponse;
use crate::utils::{ValidatedJson, ValidatedPath, shape, shape_all};

use super::model::{MemberCreateRequest, MemberResponse};

#[utoipa::path(
    get,
    path = "/members",
    responses(
        (status = 200, description = "All members", body = [MemberResponse]),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "members"
)]
#[axum::debug_handler]
pub async fn get_members(State(state): State<AppState>) -> AppResult<Json<Vec<MemberResponse>>> {
    let members = state
        .database
        .get_all_members()
        .await
        .map_err(AppError::collaborator("Failed to fetch members"))?;
    Ok(Json(shape_all("MemberResponse", members)?))
}

/// New members are created by the onboarding agent, which also assigns
/// their starter tasks.
#[utoipa::path(
    post,
    path = "/members",
    request_body = MemberCreateRequest,
    responses(
        (status = 201, description = "Member created with starter tasks", body = MemberResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "members"
)]
#[axum::debug_handler]
pub async fn create_member(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<MemberCreateRequest>,
) -> AppResult<(StatusCode, Json<MemberResponse>)> {
    let member = state
        .agents
        .onboard_new_member(&req)
        .await
        .map_err(AppError::collaborator("Failed to create member"))?;
    Ok((StatusCode::CREATED, Json(shape("MemberResponse", member)?)))
}

#[utoipa::path(
    get,
    path = "/members/{member_id}/tasks",
    params(("member_id" = i64, Path, description = "Member id")),
    responses(
        (status = 200, description = "Tasks assigned to the member", body = [TaskResponse]),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "members"
)]
#[axum::debug_handler]
pub async fn get_member_tasks(
    State(state): State<AppState>,
    ValidatedPath(member_id): ValidatedPath<i64>,
) -> AppResult<Json<Vec<TaskResponse>>> {
    let failed = AppError::collaborator("Failed to fetch member tasks");
    let tasks = match state.database.get_member_tasks(member_id).await {
        Ok(tasks) => tasks,
        Err(e) => return Err(failed(e)),
    };

    // an empty list is only a miss when the member itself is unknown
    if tasks.is_empty() {
        match state.database.get_member_by_id(member_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(AppError::NotFound("Member not found")),
            Err(e) => return Err(failed(e)),
        }
    }
    Ok(Json(shape_all("TaskResponse", tasks)?))
}
