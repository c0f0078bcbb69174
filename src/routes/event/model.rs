use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::utils::{Related, null_as_default};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Draft,
    Published,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_event_dates"))]
pub struct EventCreateRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(required(message = "Start date is required"))]
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_ids: Vec<i64>,
    #[validate(range(min = 1, message = "Maximum attendees must be greater than 0"))]
    pub max_attendees: Option<i64>,
}

/// Runs only once every per-field rule has passed.
fn validate_event_dates(req: &EventCreateRequest) -> Result<(), ValidationError> {
    let (Some(start), Some(end)) = (req.start_date, req.end_date) else {
        return Ok(());
    };
    if end > start {
        return Ok(());
    }
    let mut error = ValidationError::new("end_date_order")
        .with_message(Cow::Borrowed("End date must be after start date"));
    error.add_param(Cow::Borrowed("start_date"), &start);
    error.add_param(Cow::Borrowed("end_date"), &end);
    Err(error)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: EventStatus,
    pub max_attendees: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(value_type = Vec<Object>)]
    pub groups: Vec<Related>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attendees_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> EventCreateRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn end_before_start_is_rejected() {
        let req = request(json!({
            "title": "Sunday Service",
            "start_date": "2025-03-02T10:00:00Z",
            "end_date": "2025-03-02T09:00:00Z",
        }));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["__all__"][0].code, "end_date_order");
        assert!(!fields.contains_key("end_date"));
    }

    #[test]
    fn end_equal_to_start_is_rejected() {
        let req = request(json!({
            "title": "Sunday Service",
            "start_date": "2025-03-02T10:00:00Z",
            "end_date": "2025-03-02T10:00:00Z",
        }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn end_after_start_or_absent_passes() {
        let later = request(json!({
            "title": "Sunday Service",
            "start_date": "2025-03-02T10:00:00Z",
            "end_date": "2025-03-02T12:00:00Z",
        }));
        assert!(later.validate().is_ok());

        let open = request(json!({
            "title": "Sunday Service",
            "start_date": "2025-03-02T10:00:00Z",
        }));
        assert!(open.validate().is_ok());
    }

    #[test]
    fn missing_start_date_skips_ordering_check() {
        let req = request(json!({
            "title": "Prayer Night",
            "end_date": "2025-03-02T12:00:00Z",
        }));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("start_date"));
        assert!(!fields.contains_key("__all__"));
    }

    #[test]
    fn title_length_boundaries() {
        let start = "2025-03-02T10:00:00Z";
        let ok = request(json!({"title": "a".repeat(200), "start_date": start}));
        assert!(ok.validate().is_ok());

        let long = request(json!({"title": "a".repeat(201), "start_date": start}));
        let errors = long.validate().unwrap_err();
        assert_eq!(errors.field_errors()["title"][0].code, "length");

        let empty = request(json!({"title": "", "start_date": start}));
        assert!(empty.validate().is_err());

        let missing = request(json!({"start_date": start}));
        assert!(missing.validate().unwrap_err().field_errors().contains_key("title"));
    }

    #[test]
    fn every_violation_is_reported() {
        let req = request(json!({
            "title": "",
            "description": "d".repeat(1001),
            "location": "l".repeat(201),
            "max_attendees": 0,
        }));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["title", "description", "location", "max_attendees", "start_date"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn null_group_ids_become_empty() {
        let req = request(json!({
            "title": "Choir",
            "start_date": "2025-03-02T10:00:00Z",
            "group_ids": null,
        }));
        assert!(req.group_ids.is_empty());
    }

    #[test]
    fn revalidation_is_stable() {
        let req = request(json!({
            "title": "Retreat",
            "start_date": "2025-06-01T08:00:00Z",
            "end_date": "2025-06-03T17:00:00Z",
            "group_ids": [1, 2],
            "max_attendees": 40,
        }));
        req.validate().unwrap();
        let again = request(serde_json::to_value(&req).unwrap());
        again.validate().unwrap();
        assert_eq!(req, again);
    }

    #[test]
    fn unknown_status_lists_variants() {
        let err = serde_json::from_value::<EventStatus>(json!("postponed")).unwrap_err();
        assert!(err.to_string().contains("draft"));
        assert!(err.to_string().contains("completed"));
    }
}
