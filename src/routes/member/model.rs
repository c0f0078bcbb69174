use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::{Related, lowercase, null_as_default, validate_email_shape};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Pastor,
    Leader,
    #[default]
    Member,
    Visitor,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Pastor => "pastor",
            MemberRole::Leader => "leader",
            MemberRole::Member => "member",
            MemberRole::Visitor => "visitor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct MemberCreateRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    /// Lowercased while decoding.
    #[serde(default, deserialize_with = "lowercase")]
    #[validate(custom(function = "validate_email_shape"))]
    pub email: String,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(value_type = Vec<Object>)]
    pub groups: Vec<Related>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks_completed: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks_pending: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> MemberCreateRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn email_without_at_or_dot_is_rejected() {
        let req = request(json!({"name": "A", "email": "bad"}));
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors()["email"][0].code, "email");
    }

    #[test]
    fn email_is_lowercased() {
        let req = request(json!({"name": "A", "email": "Test@Example.com"}));
        assert!(req.validate().is_ok());
        assert_eq!(req.email, "test@example.com");
    }

    #[test]
    fn missing_email_is_rejected() {
        let req = request(json!({"name": "A"}));
        assert!(req.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn role_defaults_to_member() {
        let req = request(json!({"name": "A", "email": "a@b.org"}));
        assert_eq!(req.role, MemberRole::Member);
        assert_eq!(req.role.as_str(), "member");
    }

    #[test]
    fn unknown_role_lists_allowed_roles() {
        let err = serde_json::from_value::<MemberCreateRequest>(
            json!({"name": "A", "email": "a@b.org", "role": "bishop"}),
        )
        .unwrap_err();
        let message = err.to_string();
        for role in ["admin", "pastor", "leader", "member", "visitor"] {
            assert!(message.contains(role), "{message}");
        }
    }

    #[test]
    fn name_and_phone_errors_reported_together() {
        let req = request(json!({
            "name": "",
            "email": "nope",
            "phone": "0".repeat(21),
        }));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn response_counters_default_to_zero() {
        let resp: MemberResponse = serde_json::from_value(json!({
            "id": 1,
            "name": "Grace",
            "email": "grace@church.org",
            "phone": null,
            "role": "leader",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(resp.tasks_completed, 0);
        assert_eq!(resp.tasks_pending, 0);
        assert!(resp.groups.is_empty());
    }
}
