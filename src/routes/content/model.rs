use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use serde_json::{Map, Value};
use validator::Validate;

use crate::utils::{lowercase, null_as_default, validate_platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Flyer,
    SocialPost,
    WelcomeMaterial,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Flyer => "flyer",
            ContentKind::SocialPost => "social_post",
            ContentKind::WelcomeMaterial => "welcome_material",
        }
    }
}

fn default_style() -> String {
    "modern".to_string()
}

fn default_color_scheme() -> String {
    "church_blue".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct FlyerGenerationRequest {
    #[validate(required(message = "Event id is required"))]
    pub event_id: Option<i64>,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_color_scheme")]
    pub color_scheme: String,
    #[serde(default = "default_true")]
    pub include_qr_code: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct SocialPostRequest {
    pub event_id: Option<i64>,
    /// Lowercased while decoding, then checked against the platform allow-list.
    #[serde(default, deserialize_with = "lowercase")]
    #[validate(custom(function = "validate_platform"))]
    pub platform: String,
    /// Announcement, reminder, celebration...
    #[serde(default)]
    #[validate(length(min = 1, message = "Content type is required"))]
    pub content_type: String,
    #[validate(length(max = 500, message = "Custom message must be at most 500 characters"))]
    pub custom_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct WelcomeMaterialRequest {
    #[validate(required(message = "Member id is required"))]
    pub member_id: Option<i64>,
    /// Card, booklet, email...
    #[serde(default)]
    #[validate(length(min = 1, message = "Material type is required"))]
    pub material_type: String,
    #[serde(default = "default_true")]
    pub personalized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContentResponse {
    pub id: String,
    pub content_type: String,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
