use axum::extract::{Json, State};
use serde::de::DeserializeOwned;

use crate::AppState;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::utils::shape;

use super::model::{AttendanceInsights, DashboardInsights, EngagementInsights, InsightKind};

async fn insights<T: DeserializeOwned>(
    state: &AppState,
    kind: InsightKind,
    schema: &'static str,
    context: &'static str,
) -> AppResult<Json<T>> {
    let report = state
        .agents
        .generate_insights(kind)
        .await
        .map_err(AppError::collaborator(context))?;
    Ok(Json(shape(schema, report)?))
}

#[utoipa::path(
    get,
    path = "/insights/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardInsights),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "insights"
)]
#[axum::debug_handler]
pub async fn get_dashboard_insights(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardInsights>> {
    insights(
        &state,
        InsightKind::Dashboard,
        "DashboardInsights",
        "Failed to generate insights",
    )
    .await
}

#[utoipa::path(
    get,
    path = "/insights/attendance",
    responses(
        (status = 200, description = "Attendance analysis", body = AttendanceInsights),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "insights"
)]
#[axum::debug_handler]
pub async fn get_attendance_insights(
    State(state): State<AppState>,
) -> AppResult<Json<AttendanceInsights>> {
    insights(
        &state,
        InsightKind::Attendance,
        "AttendanceInsights",
        "Failed to generate attendance insights",
    )
    .await
}

#[utoipa::path(
    get,
    path = "/insights/engagement",
    responses(
        (status = 200, description = "Member engagement analysis", body = EngagementInsights),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "insights"
)]
#[axum::debug_handler]
pub async fn get_engagement_insights(
    State(state): State<AppState>,
) -> AppResult<Json<EngagementInsights>> {
    insights(
        &state,
        InsightKind::Engagement,
        "EngagementInsights",
        "Failed to generate engagement insights",
    )
    .await
}
