use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::{Related, null_as_default};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct GroupCreateRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    /// Worship, ushers, youth and so on. Not a closed set.
    #[serde(default)]
    #[validate(length(min = 1, message = "Group type is required"))]
    pub group_type: String,
    pub leader_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub group_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub leader: Option<Related>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub members_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(value_type = Vec<Object>)]
    pub members: Vec<Related>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_type_is_required() {
        let req: GroupCreateRequest = serde_json::from_value(json!({"name": "Ushers"})).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("group_type"));
    }

    #[test]
    fn description_bound() {
        let req: GroupCreateRequest = serde_json::from_value(json!({
            "name": "Youth",
            "group_type": "youth",
            "description": "x".repeat(501),
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req = GroupCreateRequest {
            description: Some("x".repeat(500)),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn response_requires_group_type() {
        let err = serde_json::from_value::<GroupResponse>(json!({
            "id": 1,
            "name": "Worship",
            "description": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("group_type"));
    }
}
