use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::Related;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

fn default_priority() -> String {
    "medium".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct TaskCreateRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(required(message = "Assigned member is required"))]
    pub member_id: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    /// Free text, usually low, medium or high.
    #[serde(default = "default_priority")]
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub member: Option<Related>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priority_defaults_to_medium() {
        let req: TaskCreateRequest =
            serde_json::from_value(json!({"title": "Call Ruth", "member_id": 4})).unwrap();
        assert_eq!(req.priority, "medium");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn member_reference_is_required() {
        let req: TaskCreateRequest = serde_json::from_value(json!({"title": "Call Ruth"})).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors()["member_id"][0].code, "required");
    }

    #[test]
    fn status_uses_snake_case() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("in_progress")
        );
    }

    #[test]
    fn response_without_member_shapes() {
        let resp: TaskResponse = serde_json::from_value(json!({
            "id": 9,
            "title": "Church tour",
            "description": null,
            "status": "completed",
            "priority": "high",
            "due_date": null,
            "completed_at": "2025-02-01T12:00:00Z",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-02-01T12:00:00Z",
        }))
        .unwrap();
        assert_eq!(resp.status, TaskStatus::Completed);
        assert!(resp.member.is_none());
    }
}
