use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use serde_json::{Map, Value};

use crate::utils::Related;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Dashboard,
    Attendance,
    Engagement,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Dashboard => "dashboard",
            InsightKind::Attendance => "attendance",
            InsightKind::Engagement => "engagement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardInsights {
    pub total_members: i64,
    pub total_events: i64,
    pub upcoming_events: i64,
    pub active_tasks: i64,
    #[schema(value_type = Vec<Object>)]
    pub recent_activity: Vec<Related>,
    #[schema(value_type = Object)]
    pub attendance_trend: Map<String, Value>,
    pub engagement_score: f64,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceInsights {
    pub total_events_analyzed: i64,
    pub average_attendance: f64,
    pub attendance_by_month: BTreeMap<String, i64>,
    #[schema(value_type = Vec<Object>)]
    pub top_attended_events: Vec<Related>,
    #[schema(value_type = Object)]
    pub attendance_trends: Map<String, Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub predictions: Option<Map<String, Value>>,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EngagementInsights {
    pub total_members_analyzed: i64,
    pub engagement_score: f64,
    pub active_members: i64,
    pub inactive_members: i64,
    pub engagement_by_group: BTreeMap<String, f64>,
    #[schema(value_type = Vec<Object>)]
    pub member_activity: Vec<Related>,
    pub recommendations: Vec<String>,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}
