use axum::{
    extract::{Json, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::error::ErrorResponse;
use crate::utils::error_codes;

const SERVICE_NAME: &str = "Ecclesiaflow AI Agents";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub agents_available: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub api: String,
    pub health: String,
    pub docs: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "system"
)]
#[axum::debug_handler]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        service: SERVICE_NAME.to_string(),
        agents_available: state.agents.get_available_agents(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = ServiceInfo)),
    tag = "system"
)]
#[axum::debug_handler]
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: format!("Welcome to {SERVICE_NAME} API"),
        version: env!("CARGO_PKG_VERSION").to_string(),
        api: state.config.api_base_uri.clone(),
        health: "/health".to_string(),
        docs: "/docs".to_string(),
    })
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "no route matched");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            error_codes::NOT_FOUND,
            "Not found",
            format!("No route for {}", uri.path()),
        )),
    )
}
