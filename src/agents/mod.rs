// Agent collaborator: multi-step workflows on top of the database and
// the content generator.

mod activity;
mod content;
mod insights;

pub use activity::{ActivityBoard, Agent};
pub use content::{
    ContentBrief, ContentGenerator, ContentRequest, GeminiGenerator, TemplateGenerator,
};

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::database::Database;
use crate::error::CollaboratorError;
use crate::routes::{
    event::{EventCreateRequest, EventResponse},
    group::GroupResponse,
    insights::InsightKind,
    member::{MemberCreateRequest, MemberResponse},
    task::{TaskCreateRequest, TaskResponse},
};

type AgentResult<T> = Result<T, CollaboratorError>;

/// Tasks every new member starts with: (title, description, days until due, priority).
const ONBOARDING_TASKS: [(&str, &str, i64, &str); 4] = [
    (
        "Send welcome packet",
        "Share the welcome packet and service times.",
        1,
        "high",
    ),
    (
        "Schedule pastor meeting",
        "Book a short introduction meeting with a pastor.",
        7,
        "medium",
    ),
    (
        "Assign ministry group",
        "Help the member find a ministry group that fits.",
        14,
        "medium",
    ),
    (
        "Church tour",
        "Walk the member through the building and ministries.",
        14,
        "low",
    ),
];

/// The onboarding list for a new member; the database fills in `member_id`.
fn starter_tasks(member: &MemberCreateRequest, now: DateTime<Utc>) -> Vec<TaskCreateRequest> {
    ONBOARDING_TASKS
        .iter()
        // members who picked groups at sign-up already have one
        .filter(|(title, ..)| !(*title == "Assign ministry group" && !member.group_ids.is_empty()))
        .map(|(title, description, due_in_days, priority)| TaskCreateRequest {
            title: title.to_string(),
            description: Some(description.to_string()),
            member_id: None,
            due_date: Some(now + Duration::days(*due_in_days)),
            priority: priority.to_string(),
        })
        .collect()
}

pub struct AgentManager {
    database: Arc<dyn Database>,
    generator: Arc<dyn ContentGenerator>,
    activity: ActivityBoard,
}

fn decode<T: DeserializeOwned>(record: Value) -> AgentResult<T> {
    Ok(serde_json::from_value(record)?)
}

fn decode_all<T: DeserializeOwned>(records: Vec<Value>) -> AgentResult<Vec<T>> {
    records.into_iter().map(decode).collect()
}

impl AgentManager {
    pub fn new(database: Arc<dyn Database>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            database,
            generator,
            activity: ActivityBoard::default(),
        }
    }

    pub fn get_available_agents(&self) -> Vec<String> {
        Agent::ALL.iter().map(|a| a.name().to_string()).collect()
    }

    async fn run<T, F>(&self, agent: Agent, work: F) -> AgentResult<T>
    where
        F: Future<Output = AgentResult<T>>,
    {
        let _in_flight = self.activity.begin(agent);
        let result = work.await;
        self.activity.finish(agent, result.is_ok());
        if let Err(e) = &result {
            tracing::warn!(agent = agent.name(), error = %e, "agent task failed");
        }
        result
    }

    pub async fn create_event_with_agents(&self, event: &EventCreateRequest) -> AgentResult<Value> {
        self.run(Agent::Calendar, async {
            let created = self.database.create_event(event).await?;
            tracing::info!(event_id = ?created.get("id"), groups = event.group_ids.len(), "event created");
            Ok(created)
        })
        .await
    }

    pub async fn onboard_new_member(&self, member: &MemberCreateRequest) -> AgentResult<Value> {
        self.run(Agent::Onboarding, async {
            let starter_tasks = starter_tasks(member, Utc::now());
            let created = self.database.create_member(member, &starter_tasks).await?;
            tracing::info!(
                member_id = ?created.get("id"),
                tasks = starter_tasks.len(),
                "member onboarded"
            );
            Ok(created)
        })
        .await
    }

    pub async fn generate_content(&self, request: ContentRequest) -> AgentResult<Value> {
        self.run(Agent::Content, async {
            let brief = match &request {
                ContentRequest::Flyer(req) => {
                    let event = self.event(req.event_id).await?;
                    content::flyer_brief(req, &event)
                }
                ContentRequest::SocialPost(req) => {
                    let event = match req.event_id {
                        Some(id) => Some(self.event(Some(id)).await?),
                        None => None,
                    };
                    content::social_post_brief(req, event.as_ref())
                }
                ContentRequest::WelcomeMaterial(req) => {
                    let member = self.member(req.member_id).await?;
                    content::welcome_brief(req, &member)
                }
            };

            let text = self.generator.generate(&brief).await?;

            let mut metadata = Map::new();
            metadata.insert("generator".into(), json!(self.generator.name()));
            metadata.insert("request".into(), request.to_value()?);

            Ok(json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "content_type": brief.kind.as_str(),
                "title": brief.title,
                "content": text,
                "image_url": null,
                "metadata": metadata,
                "created_at": Utc::now(),
            }))
        })
        .await
    }

    pub async fn generate_insights(&self, kind: InsightKind) -> AgentResult<Value> {
        self.run(Agent::Insights, async {
            let now = Utc::now();
            let value = match kind {
                InsightKind::Dashboard => {
                    let events: Vec<EventResponse> = decode_all(self.database.get_all_events().await?)?;
                    let members: Vec<MemberResponse> = decode_all(self.database.get_all_members().await?)?;
                    let groups: Vec<GroupResponse> = decode_all(self.database.get_all_groups().await?)?;
                    let tasks: Vec<TaskResponse> = decode_all(self.database.get_all_tasks().await?)?;
                    serde_json::to_value(insights::dashboard(&events, &members, &groups, &tasks, now))?
                }
                InsightKind::Attendance => {
                    let events: Vec<EventResponse> = decode_all(self.database.get_all_events().await?)?;
                    serde_json::to_value(insights::attendance(&events, now))?
                }
                InsightKind::Engagement => {
                    let members: Vec<MemberResponse> = decode_all(self.database.get_all_members().await?)?;
                    let groups: Vec<GroupResponse> = decode_all(self.database.get_all_groups().await?)?;
                    serde_json::to_value(insights::engagement(&members, &groups, now))?
                }
            };
            tracing::debug!(kind = kind.as_str(), "insights generated");
            Ok(value)
        })
        .await
    }

    pub async fn get_agent_status(&self) -> AgentResult<Value> {
        Ok(serde_json::to_value(self.activity.snapshot())?)
    }

    async fn event(&self, event_id: Option<i64>) -> AgentResult<EventResponse> {
        let id = event_id.ok_or_else(|| CollaboratorError::Missing("event id".into()))?;
        let record = self
            .database
            .get_event_by_id(id)
            .await?
            .ok_or_else(|| CollaboratorError::Missing(format!("event {id}")))?;
        decode(record)
    }

    async fn member(&self, member_id: Option<i64>) -> AgentResult<MemberResponse> {
        let id = member_id.ok_or_else(|| CollaboratorError::Missing("member id".into()))?;
        let record = self
            .database
            .get_member_by_id(id)
            .await?
            .ok_or_else(|| CollaboratorError::Missing(format!("member {id}")))?;
        decode(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryDatabase;
    use crate::routes::content::FlyerGenerationRequest;

    fn manager() -> (Arc<MemoryDatabase>, AgentManager) {
        let db = Arc::new(MemoryDatabase::new());
        let manager = AgentManager::new(db.clone(), Arc::new(TemplateGenerator));
        (db, manager)
    }

    #[tokio::test]
    async fn onboarding_creates_starter_tasks() {
        let (db, manager) = manager();
        let member: MemberCreateRequest =
            serde_json::from_value(json!({"name": "Lydia", "email": "lydia@church.org"})).unwrap();

        let created = manager.onboard_new_member(&member).await.unwrap();
        assert_eq!(created["tasks_pending"], 4);

        let id = created["id"].as_i64().unwrap();
        let tasks = db.get_member_tasks(id).await.unwrap();
        assert_eq!(tasks[0]["title"], "Send welcome packet");
        assert_eq!(tasks[0]["priority"], "high");
    }

    #[tokio::test]
    async fn flyer_for_missing_event_fails_and_is_counted() {
        let (_, manager) = manager();
        let req: FlyerGenerationRequest = serde_json::from_value(json!({"event_id": 77})).unwrap();

        let err = manager
            .generate_content(ContentRequest::Flyer(req))
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Missing(_)));

        let status = manager.activity.snapshot();
        let content = status.agents.iter().find(|a| a.name == "content_agent").unwrap();
        assert_eq!(content.tasks_failed, 1);
        assert_eq!(content.status, "error");
    }

    #[tokio::test]
    async fn flyer_uses_event_details() {
        let (db, manager) = manager();
        let event: EventCreateRequest = serde_json::from_value(json!({
            "title": "Harvest Festival",
            "start_date": "2025-10-12T15:00:00Z",
            "location": "Fellowship Hall",
        }))
        .unwrap();
        let event = db.create_event(&event).await.unwrap();

        let req: FlyerGenerationRequest =
            serde_json::from_value(json!({"event_id": event["id"]})).unwrap();
        let content = manager
            .generate_content(ContentRequest::Flyer(req))
            .await
            .unwrap();

        assert_eq!(content["content_type"], "flyer");
        assert_eq!(content["title"], "Harvest Festival Flyer");
        assert!(content["content"].as_str().unwrap().contains("Fellowship Hall"));
        assert_eq!(content["metadata"]["generator"], "template");
        assert_eq!(content["metadata"]["request"]["style"], "modern");
    }

    #[test]
    fn grouped_members_skip_group_assignment() {
        let member: MemberCreateRequest = serde_json::from_value(json!({
            "name": "Lois",
            "email": "lois@church.org",
            "group_ids": [1],
        }))
        .unwrap();
        let tasks = starter_tasks(&member, Utc::now());
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.title != "Assign ministry group"));
    }

    #[tokio::test]
    async fn failed_onboarding_leaves_nothing_behind() {
        let (db, manager) = manager();
        // group 9 does not exist, so the whole sign-up is refused
        let member: MemberCreateRequest = serde_json::from_value(json!({
            "name": "Eunice",
            "email": "eunice@church.org",
            "group_ids": [9],
        }))
        .unwrap();

        assert!(manager.onboard_new_member(&member).await.is_err());
        assert!(db.get_all_members().await.unwrap().is_empty());
        assert!(db.get_all_tasks().await.unwrap().is_empty());

        // a retry with a valid body is not blocked by a half-created member
        let retry: MemberCreateRequest =
            serde_json::from_value(json!({"name": "Eunice", "email": "eunice@church.org"})).unwrap();
        let created = manager.onboard_new_member(&retry).await.unwrap();
        assert_eq!(created["tasks_pending"], 4);
    }

    #[test]
    fn lists_four_agents() {
        let (_, manager) = manager();
        assert_eq!(
            manager.get_available_agents(),
            vec!["calendar_agent", "content_agent", "insights_agent", "onboarding_agent"]
        );
    }
}
