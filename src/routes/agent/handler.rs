use axum::extract::{Json, State};

use crate::AppState;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::utils::shape;

use super::model::AgentSystemStatus;

#[utoipa::path(
    get,
    path = "/agents/status",
    responses(
        (status = 200, description = "Per-agent counters and system health", body = AgentSystemStatus),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "agents"
)]
#[axum::debug_handler]
pub async fn get_agent_status(State(state): State<AppState>) -> AppResult<Json<AgentSystemStatus>> {
    let status = state
        .agents
        .get_agent_status()
        .await
        .map_err(AppError::collaborator("Failed to get agent status"))?;
    Ok(Json(shape("AgentSystemStatus", status)?))
}
