use axum::extract::{Json, State};

use crate::AppState;
use crate::agents::ContentRequest;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::utils::{ValidatedJson, shape};

use super::model::{
    ContentResponse, FlyerGenerationRequest, SocialPostRequest, WelcomeMaterialRequest,
};

async fn generate(
    state: &AppState,
    request: ContentRequest,
    context: &'static str,
) -> AppResult<Json<ContentResponse>> {
    let content = state
        .agents
        .generate_content(request)
        .await
        .map_err(AppError::collaborator(context))?;
    Ok(Json(shape("ContentResponse", content)?))
}

#[utoipa::path(
    post,
    path = "/content/generate-flyer",
    request_body = FlyerGenerationRequest,
    responses(
        (status = 200, description = "Generated flyer text", body = ContentResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "content"
)]
#[axum::debug_handler]
pub async fn generate_flyer(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<FlyerGenerationRequest>,
) -> AppResult<Json<ContentResponse>> {
    generate(&state, ContentRequest::Flyer(req), "Failed to generate flyer").await
}

#[utoipa::path(
    post,
    path = "/content/generate-social",
    request_body = SocialPostRequest,
    responses(
        (status = 200, description = "Generated social media post", body = ContentResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "content"
)]
#[axum::debug_handler]
pub async fn generate_social_post(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SocialPostRequest>,
) -> AppResult<Json<ContentResponse>> {
    generate(
        &state,
        ContentRequest::SocialPost(req),
        "Failed to generate social post",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/content/generate-welcome",
    request_body = WelcomeMaterialRequest,
    responses(
        (status = 200, description = "Generated welcome material", body = ContentResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Collaborator failure", body = ErrorResponse)
    ),
    tag = "content"
)]
#[axum::debug_handler]
pub async fn generate_welcome_materials(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<WelcomeMaterialRequest>,
) -> AppResult<Json<ContentResponse>> {
    generate(
        &state,
        ContentRequest::WelcomeMaterial(req),
        "Failed to generate welcome materials",
    )
    .await
}
