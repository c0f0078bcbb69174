use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::utils::{ValidatedJson, shape, shape_all};

use super::model::{GroupCreateRequest, GroupResponse};

#[utoipa::path(
    get,
    path = "/groups",
    responses(
        (status = 200, description = "All groups", body = [GroupResponse]),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "groups"
)]
#[axum::debug_handler]
pub async fn get_groups(State(state): State<AppState>) -> AppResult<Json<Vec<GroupResponse>>> {
    let groups = state
        .database
        .get_all_groups()
        .await
        .map_err(AppError::collaborator("Failed to fetch groups"))?;
    Ok(Json(shape_all("GroupResponse", groups)?))
}

#[utoipa::path(
    post,
    path = "/groups",
    request_body = GroupCreateRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "groups"
)]
#[axum::debug_handler]
pub async fn create_group(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<GroupCreateRequest>,
) -> AppResult<(StatusCode, Json<GroupResponse>)> {
    match state.database.create_group(&req).await {
        Ok(group) => Ok((StatusCode::CREATED, Json(shape("GroupResponse", group)?))),
        Err(e) => Err(AppError::collaborator("Failed to create group")(e)),
    }
}
