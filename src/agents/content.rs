use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::Config;
use crate::error::CollaboratorError;
use crate::routes::content::{
    ContentKind, FlyerGenerationRequest, SocialPostRequest, WelcomeMaterialRequest,
};
use crate::routes::event::EventResponse;
use crate::routes::member::MemberResponse;

/// A validated content request, one variant per generation endpoint.
#[derive(Debug, Clone)]
pub enum ContentRequest {
    Flyer(FlyerGenerationRequest),
    SocialPost(SocialPostRequest),
    WelcomeMaterial(WelcomeMaterialRequest),
}

impl ContentRequest {
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            ContentRequest::Flyer(req) => serde_json::to_value(req),
            ContentRequest::SocialPost(req) => serde_json::to_value(req),
            ContentRequest::WelcomeMaterial(req) => serde_json::to_value(req),
        }
    }
}

/// What the content agent asks a generator for: a model prompt plus the
/// plain-text rendition used when no model is configured.
#[derive(Debug, Clone)]
pub struct ContentBrief {
    pub kind: ContentKind,
    pub title: Option<String>,
    pub prompt: String,
    pub fallback: String,
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, brief: &ContentBrief) -> Result<String, CollaboratorError>;
}

/// Deterministic generator used when no API key is configured.
pub struct TemplateGenerator;

#[async_trait]
impl ContentGenerator for TemplateGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(&self, brief: &ContentBrief) -> Result<String, CollaboratorError> {
        Ok(brief.fallback.clone())
    }
}

pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(config: &Config, api_key: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.agent_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, brief: &ContentBrief) -> Result<String, CollaboratorError> {
        // key goes in a header so it never shows up in logged URLs
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": brief.prompt}]}],
        });

        tracing::info!(model = %self.model, kind = brief.kind.as_str(), "Calling Gemini");
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(CollaboratorError::UpstreamStatus {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        let data: Value = serde_json::from_str(&text)?;
        extract_text(&data)
            .ok_or_else(|| CollaboratorError::Missing("Gemini returned no text candidates".into()))
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(data: &Value) -> Option<String> {
    let parts = data["candidates"].get(0)?["content"]["parts"].as_array()?;
    let text: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    let joined = text.join("").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

pub fn flyer_brief(req: &FlyerGenerationRequest, event: &EventResponse) -> ContentBrief {
    let when = event.start_date.format("%A, %B %-d %Y at %H:%M");
    let location = event.location.as_deref().unwrap_or("our church");
    let description = event.description.as_deref().unwrap_or("");
    let qr = if req.include_qr_code {
        "Include a line inviting readers to scan the QR code to register."
    } else {
        "Do not mention a QR code."
    };

    ContentBrief {
        kind: ContentKind::Flyer,
        title: Some(format!("{} Flyer", event.title)),
        prompt: format!(
            "Write the text for a {style} church event flyer using the {colors} color scheme.\n\
             Event: {title}\nWhen: {when}\nWhere: {location}\nDetails: {description}\n\
             Keep it warm, short and inviting. {qr}",
            style = req.style,
            colors = req.color_scheme,
            title = event.title,
        ),
        fallback: format!(
            "{title}\n{when}\n{location}\n\n{description}\n\nEveryone is welcome!{register}",
            title = event.title,
            register = if req.include_qr_code {
                "\nScan the QR code to register."
            } else {
                ""
            },
        ),
    }
}

pub fn social_post_brief(req: &SocialPostRequest, event: Option<&EventResponse>) -> ContentBrief {
    let limit = match req.platform.as_str() {
        "twitter" => "Stay under 280 characters.",
        "linkedin" => "Use a professional tone.",
        "instagram" => "Add a few relevant hashtags.",
        _ => "Keep it friendly and concise.",
    };
    let about = event
        .map(|e| {
            format!(
                "{} on {}{}",
                e.title,
                e.start_date.format("%B %-d"),
                e.location
                    .as_deref()
                    .map(|l| format!(" at {l}"))
                    .unwrap_or_default()
            )
        })
        .unwrap_or_else(|| "our church community".to_string());
    let custom = req.custom_message.as_deref().unwrap_or("");

    ContentBrief {
        kind: ContentKind::SocialPost,
        title: Some(format!("{} {}", req.platform, req.content_type)),
        prompt: format!(
            "Write a {platform} {kind} post for a church about {about}. {limit}\n{custom}",
            platform = req.platform,
            kind = req.content_type,
        ),
        fallback: [format!("{}: {about}", capitalize(&req.content_type)), custom.to_string()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn welcome_brief(req: &WelcomeMaterialRequest, member: &MemberResponse) -> ContentBrief {
    let greeting = if req.personalized {
        format!("Dear {}", member.name)
    } else {
        "Dear friend".to_string()
    };

    ContentBrief {
        kind: ContentKind::WelcomeMaterial,
        title: Some(format!("Welcome {}", req.material_type)),
        prompt: format!(
            "Write a welcome {material} for a new church member. {personal}\n\
             Mention that our team will reach out about groups and next steps.",
            material = req.material_type,
            personal = if req.personalized {
                format!("Address them by name: {}.", member.name)
            } else {
                "Do not use their name.".to_string()
            },
        ),
        fallback: format!(
            "{greeting},\n\nWelcome to our church family! We are so glad you are here. \
             Someone from our team will reach out soon to help you find a group and \
             take your next steps."
        ),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let data = json!({
            "candidates": [{
                "content": {"parts": [{"text": "Join us "}, {"text": "this Sunday!"}]},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&data).as_deref(), Some("Join us this Sunday!"));
    }

    #[test]
    fn no_candidates_yields_none() {
        assert!(extract_text(&json!({"candidates": []})).is_none());
        assert!(extract_text(&json!({"promptFeedback": {"blockReason": "SAFETY"}})).is_none());
    }

    #[test]
    fn social_post_without_event() {
        let req: SocialPostRequest = serde_json::from_value(json!({
            "platform": "twitter",
            "content_type": "reminder",
            "custom_message": "Bring a friend",
        }))
        .unwrap();
        let brief = social_post_brief(&req, None);
        assert!(brief.prompt.contains("280"));
        assert_eq!(brief.fallback, "Reminder: our church community\nBring a friend");
    }

    #[test]
    fn capitalize_handles_empty() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("announcement"), "Announcement");
    }
}
