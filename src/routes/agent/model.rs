use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentStatus {
    pub name: String,
    /// active, busy, error or offline.
    pub status: String,
    pub last_activity: Option<DateTime<Utc>>,
    pub tasks_completed: i64,
    pub tasks_failed: i64,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentSystemStatus {
    pub agents: Vec<AgentStatus>,
    /// healthy, degraded or critical.
    pub system_health: String,
    pub total_tasks_today: i64,
    pub success_rate: f64,
    pub uptime: String,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}
