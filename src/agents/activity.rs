use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};

use crate::routes::agent::{AgentStatus, AgentSystemStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agent {
    Calendar,
    Content,
    Insights,
    Onboarding,
}

impl Agent {
    pub const ALL: [Agent; 4] = [
        Agent::Calendar,
        Agent::Content,
        Agent::Insights,
        Agent::Onboarding,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Agent::Calendar => "calendar_agent",
            Agent::Content => "content_agent",
            Agent::Insights => "insights_agent",
            Agent::Onboarding => "onboarding_agent",
        }
    }

    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            Agent::Calendar => &["create_event", "link_groups"],
            Agent::Content => &["generate_flyer", "generate_social_post", "generate_welcome_material"],
            Agent::Insights => &["dashboard_insights", "attendance_insights", "engagement_insights"],
            Agent::Onboarding => &["register_member", "assign_onboarding_tasks"],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Default, Clone)]
struct Counters {
    completed: i64,
    failed: i64,
    in_flight: u32,
    last_failed: bool,
    last_activity: Option<DateTime<Utc>>,
    day: Option<NaiveDate>,
    day_total: i64,
}

impl Counters {
    fn status(&self) -> &'static str {
        if self.in_flight > 0 {
            "busy"
        } else if self.last_failed {
            "error"
        } else {
            "active"
        }
    }
}

/// Per-agent task counters, shared by all requests.
pub struct ActivityBoard {
    started: Instant,
    counters: Mutex<[Counters; 4]>,
}

impl Default for ActivityBoard {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            counters: Mutex::new(Default::default()),
        }
    }
}

/// Released when the tracked work finishes or is dropped mid-flight.
pub struct InFlight<'a> {
    board: &'a ActivityBoard,
    agent: Agent,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.board.with(self.agent, |c| c.in_flight = c.in_flight.saturating_sub(1));
    }
}

impl ActivityBoard {
    fn with<R>(&self, agent: Agent, f: impl FnOnce(&mut Counters) -> R) -> R {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut counters[agent.index()])
    }

    pub fn begin(&self, agent: Agent) -> InFlight<'_> {
        self.with(agent, |c| c.in_flight += 1);
        InFlight { board: self, agent }
    }

    pub fn finish(&self, agent: Agent, succeeded: bool) {
        let now = Utc::now();
        self.with(agent, |c| {
            if succeeded {
                c.completed += 1;
            } else {
                c.failed += 1;
            }
            c.last_failed = !succeeded;
            c.last_activity = Some(now);
            let today = now.date_naive();
            if c.day != Some(today) {
                c.day = Some(today);
                c.day_total = 0;
            }
            c.day_total += 1;
        });
    }

    pub fn snapshot(&self) -> AgentSystemStatus {
        let counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        let today = Utc::now().date_naive();

        let agents: Vec<AgentStatus> = Agent::ALL
            .iter()
            .map(|agent| {
                let c = &counters[agent.index()];
                AgentStatus {
                    name: agent.name().to_string(),
                    status: c.status().to_string(),
                    last_activity: c.last_activity,
                    tasks_completed: c.completed,
                    tasks_failed: c.failed,
                    capabilities: agent.capabilities().iter().map(|s| s.to_string()).collect(),
                }
            })
            .collect();

        let completed: i64 = counters.iter().map(|c| c.completed).sum();
        let failed: i64 = counters.iter().map(|c| c.failed).sum();
        let success_rate = if completed + failed == 0 {
            1.0
        } else {
            completed as f64 / (completed + failed) as f64
        };
        let total_tasks_today = counters
            .iter()
            .filter(|c| c.day == Some(today))
            .map(|c| c.day_total)
            .sum();

        AgentSystemStatus {
            agents,
            system_health: health_label(success_rate).to_string(),
            total_tasks_today,
            success_rate,
            uptime: format_uptime(self.started.elapsed().as_secs()),
            generated_at: Utc::now(),
        }
    }
}

fn health_label(success_rate: f64) -> &'static str {
    if success_rate >= 0.9 {
        "healthy"
    } else if success_rate >= 0.7 {
        "degraded"
    } else {
        "critical"
    }
}

fn format_uptime(secs: u64) -> String {
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_board_is_healthy() {
        let status = ActivityBoard::default().snapshot();
        assert_eq!(status.agents.len(), 4);
        assert_eq!(status.system_health, "healthy");
        assert_eq!(status.success_rate, 1.0);
        assert!(status.agents.iter().all(|a| a.status == "active"));
    }

    #[test]
    fn in_flight_work_marks_agent_busy() {
        let board = ActivityBoard::default();
        let guard = board.begin(Agent::Content);
        let status = board.snapshot();
        assert_eq!(status.agents[1].status, "busy");

        drop(guard);
        assert_eq!(board.snapshot().agents[1].status, "active");
    }

    #[test]
    fn failures_degrade_health() {
        let board = ActivityBoard::default();
        board.finish(Agent::Insights, true);
        board.finish(Agent::Insights, false);

        let status = board.snapshot();
        assert_eq!(status.agents[2].status, "error");
        assert_eq!(status.agents[2].tasks_failed, 1);
        assert_eq!(status.total_tasks_today, 2);
        assert_eq!(status.success_rate, 0.5);
        assert_eq!(status.system_health, "critical");
    }

    #[test]
    fn uptime_format() {
        assert_eq!(format_uptime(3725), "1h 2m 5s");
    }
}
