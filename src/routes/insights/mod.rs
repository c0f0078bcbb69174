pub(crate) mod handler;
mod model;

pub use handler::{get_attendance_insights, get_dashboard_insights, get_engagement_insights};
pub use model::{AttendanceInsights, DashboardInsights, EngagementInsights, InsightKind};
