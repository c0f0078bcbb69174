use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::sync::RwLock;

use super::{Database, DbResult};
use crate::error::CollaboratorError;
use crate::routes::{
    event::{EventCreateRequest, EventStatus},
    group::GroupCreateRequest,
    member::{MemberCreateRequest, MemberRole},
    task::{TaskCreateRequest, TaskStatus},
};

struct EventRow {
    title: String,
    description: Option<String>,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    location: Option<String>,
    status: EventStatus,
    max_attendees: Option<i64>,
    created_at: DateTime<Utc>,
}

struct MemberRow {
    name: String,
    email: String,
    phone: Option<String>,
    role: MemberRole,
    created_at: DateTime<Utc>,
}

struct GroupRow {
    name: String,
    description: Option<String>,
    group_type: String,
    leader_id: Option<i64>,
    created_at: DateTime<Utc>,
}

struct TaskRow {
    title: String,
    description: Option<String>,
    member_id: i64,
    status: TaskStatus,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    next_id: i64,
    events: BTreeMap<i64, EventRow>,
    members: BTreeMap<i64, MemberRow>,
    groups: BTreeMap<i64, GroupRow>,
    tasks: BTreeMap<i64, TaskRow>,
    // (group_id, member_id)
    group_members: BTreeSet<(i64, i64)>,
    // (event_id, group_id)
    event_groups: BTreeSet<(i64, i64)>,
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_task(&mut self, member_id: i64, task: &TaskCreateRequest) -> i64 {
        let id = self.allocate_id();
        let now = Utc::now();
        self.tasks.insert(
            id,
            TaskRow {
                title: task.title.clone(),
                description: task.description.clone(),
                member_id,
                status: TaskStatus::Pending,
                priority: task.priority.clone(),
                due_date: task.due_date,
                completed_at: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    fn group_summary(&self, group_id: i64) -> Option<Value> {
        self.groups.get(&group_id).map(|g| {
            json!({"id": group_id, "name": g.name, "group_type": g.group_type})
        })
    }

    fn member_summary(&self, member_id: i64) -> Option<Value> {
        self.members.get(&member_id).map(|m| {
            json!({"id": member_id, "name": m.name, "email": m.email})
        })
    }

    fn event_json(&self, id: i64, e: &EventRow) -> Value {
        let groups: Vec<Value> = self
            .event_groups
            .iter()
            .filter(|(event_id, _)| *event_id == id)
            .filter_map(|(_, group_id)| self.group_summary(*group_id))
            .collect();
        json!({
            "id": id,
            "title": e.title,
            "description": e.description,
            "start_date": e.start_date,
            "end_date": e.end_date,
            "location": e.location,
            "status": e.status,
            "max_attendees": e.max_attendees,
            "created_at": e.created_at,
            "updated_at": e.created_at,
            "groups": groups,
            "attendees_count": 0,
        })
    }

    fn member_json(&self, id: i64, m: &MemberRow) -> Value {
        let groups: Vec<Value> = self
            .group_members
            .iter()
            .filter(|(_, member_id)| *member_id == id)
            .filter_map(|(group_id, _)| self.group_summary(*group_id))
            .collect();
        let (completed, pending) = self
            .tasks
            .values()
            .filter(|t| t.member_id == id)
            .fold((0, 0), |(done, open), t| match t.status {
                TaskStatus::Completed => (done + 1, open),
                _ => (done, open + 1),
            });
        json!({
            "id": id,
            "name": m.name,
            "email": m.email,
            "phone": m.phone,
            "role": m.role,
            "created_at": m.created_at,
            "updated_at": m.created_at,
            "groups": groups,
            "tasks_completed": completed,
            "tasks_pending": pending,
        })
    }

    fn group_json(&self, id: i64, g: &GroupRow) -> Value {
        let members: Vec<Value> = self
            .group_members
            .iter()
            .filter(|(group_id, _)| *group_id == id)
            .filter_map(|(_, member_id)| {
                self.members.get(member_id).map(|m| {
                    json!({"id": member_id, "name": m.name, "email": m.email, "role": m.role})
                })
            })
            .collect();
        json!({
            "id": id,
            "name": g.name,
            "description": g.description,
            "group_type": g.group_type,
            "created_at": g.created_at,
            "updated_at": g.created_at,
            "leader": g.leader_id.and_then(|l| self.member_summary(l)),
            "members_count": members.len(),
            "members": members,
        })
    }

    fn task_json(&self, id: i64, t: &TaskRow) -> Value {
        json!({
            "id": id,
            "title": t.title,
            "description": t.description,
            "status": t.status,
            "priority": t.priority,
            "due_date": t.due_date,
            "completed_at": t.completed_at,
            "created_at": t.created_at,
            "updated_at": t.updated_at,
            "member": self.member_summary(t.member_id),
        })
    }
}

/// In-process store with the same record layout as `PgDatabase`.
#[derive(Default)]
pub struct MemoryDatabase {
    store: RwLock<Store>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(entity: &str, id: i64) -> CollaboratorError {
    CollaboratorError::Missing(format!("{entity} {id}"))
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn get_all_events(&self) -> DbResult<Vec<Value>> {
        let store = self.store.read().await;
        let mut events: Vec<_> = store.events.iter().collect();
        events.sort_by_key(|(id, e)| (e.start_date, **id));
        Ok(events
            .into_iter()
            .map(|(id, e)| store.event_json(*id, e))
            .collect())
    }

    async fn get_event_by_id(&self, event_id: i64) -> DbResult<Option<Value>> {
        let store = self.store.read().await;
        Ok(store
            .events
            .get(&event_id)
            .map(|e| store.event_json(event_id, e)))
    }

    async fn create_event(&self, event: &EventCreateRequest) -> DbResult<Value> {
        let mut store = self.store.write().await;
        let start_date = event
            .start_date
            .ok_or_else(|| CollaboratorError::Missing("event start_date".into()))?;
        if let Some(group_id) = event.group_ids.iter().find(|g| !store.groups.contains_key(*g)) {
            return Err(missing("group", *group_id));
        }

        let id = store.allocate_id();
        store.events.insert(
            id,
            EventRow {
                title: event.title.clone(),
                description: event.description.clone(),
                start_date,
                end_date: event.end_date,
                location: event.location.clone(),
                status: EventStatus::Draft,
                max_attendees: event.max_attendees,
                created_at: Utc::now(),
            },
        );
        for group_id in &event.group_ids {
            store.event_groups.insert((id, *group_id));
        }

        let row = &store.events[&id];
        Ok(store.event_json(id, row))
    }

    async fn get_all_members(&self) -> DbResult<Vec<Value>> {
        let store = self.store.read().await;
        let mut members: Vec<_> = store.members.iter().collect();
        members.sort_by(|a, b| a.1.name.cmp(&b.1.name).then(a.0.cmp(b.0)));
        Ok(members
            .into_iter()
            .map(|(id, m)| store.member_json(*id, m))
            .collect())
    }

    async fn create_member(
        &self,
        member: &MemberCreateRequest,
        starter_tasks: &[TaskCreateRequest],
    ) -> DbResult<Value> {
        // every check happens before the first insert, under one write lock
        let mut store = self.store.write().await;
        if store.members.values().any(|m| m.email == member.email) {
            return Err(CollaboratorError::Conflict(format!(
                "email {} is already registered",
                member.email
            )));
        }
        if let Some(group_id) = member.group_ids.iter().find(|g| !store.groups.contains_key(*g)) {
            return Err(missing("group", *group_id));
        }

        let id = store.allocate_id();
        store.members.insert(
            id,
            MemberRow {
                name: member.name.clone(),
                email: member.email.clone(),
                phone: member.phone.clone(),
                role: member.role,
                created_at: Utc::now(),
            },
        );
        for group_id in &member.group_ids {
            store.group_members.insert((*group_id, id));
        }
        for task in starter_tasks {
            store.insert_task(id, task);
        }

        let row = &store.members[&id];
        Ok(store.member_json(id, row))
    }

    async fn get_member_by_id(&self, member_id: i64) -> DbResult<Option<Value>> {
        let store = self.store.read().await;
        Ok(store
            .members
            .get(&member_id)
            .map(|m| store.member_json(member_id, m)))
    }

    async fn get_member_tasks(&self, member_id: i64) -> DbResult<Vec<Value>> {
        let store = self.store.read().await;
        Ok(store
            .tasks
            .iter()
            .filter(|(_, t)| t.member_id == member_id)
            .map(|(id, t)| store.task_json(*id, t))
            .collect())
    }

    async fn get_all_groups(&self) -> DbResult<Vec<Value>> {
        let store = self.store.read().await;
        let mut groups: Vec<_> = store.groups.iter().collect();
        groups.sort_by(|a, b| a.1.name.cmp(&b.1.name).then(a.0.cmp(b.0)));
        Ok(groups
            .into_iter()
            .map(|(id, g)| store.group_json(*id, g))
            .collect())
    }

    async fn create_group(&self, group: &GroupCreateRequest) -> DbResult<Value> {
        let mut store = self.store.write().await;
        if let Some(leader_id) = group.leader_id {
            if !store.members.contains_key(&leader_id) {
                return Err(missing("member", leader_id));
            }
        }

        let id = store.allocate_id();
        store.groups.insert(
            id,
            GroupRow {
                name: group.name.clone(),
                description: group.description.clone(),
                group_type: group.group_type.clone(),
                leader_id: group.leader_id,
                created_at: Utc::now(),
            },
        );
        if let Some(leader_id) = group.leader_id {
            store.group_members.insert((id, leader_id));
        }

        let row = &store.groups[&id];
        Ok(store.group_json(id, row))
    }

    async fn get_all_tasks(&self) -> DbResult<Vec<Value>> {
        let store = self.store.read().await;
        Ok(store
            .tasks
            .iter()
            .map(|(id, t)| store.task_json(*id, t))
            .collect())
    }

    async fn create_task(&self, task: &TaskCreateRequest) -> DbResult<Value> {
        let mut store = self.store.write().await;
        let member_id = task
            .member_id
            .ok_or_else(|| CollaboratorError::Missing("task member_id".into()))?;
        if !store.members.contains_key(&member_id) {
            return Err(missing("member", member_id));
        }

        let id = store.insert_task(member_id, task);
        let row = &store.tasks[&id];
        Ok(store.task_json(id, row))
    }

    async fn complete_task(&self, task_id: i64) -> DbResult<Option<Value>> {
        let mut store = self.store.write().await;
        let Some(task) = store.tasks.get_mut(&task_id) else {
            return Ok(None);
        };
        let now = Utc::now();
        task.status = TaskStatus::Completed;
        task.completed_at.get_or_insert(now);
        task.updated_at = now;

        let row = &store.tasks[&task_id];
        Ok(Some(store.task_json(task_id, row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member(name: &str, email: &str) -> MemberCreateRequest {
        serde_json::from_value(json!({"name": name, "email": email})).unwrap()
    }

    #[tokio::test]
    async fn complete_unknown_task_is_none() {
        let db = MemoryDatabase::new();
        assert!(db.complete_task(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn completing_a_task_updates_member_counters() {
        let db = MemoryDatabase::new();
        let created = db.create_member(&member("Ruth", "ruth@church.org"), &[]).await.unwrap();
        let member_id = created["id"].as_i64().unwrap();

        let task: TaskCreateRequest =
            serde_json::from_value(json!({"title": "Church tour", "member_id": member_id})).unwrap();
        let task = db.create_task(&task).await.unwrap();
        let task_id = task["id"].as_i64().unwrap();

        let before = db.get_member_by_id(member_id).await.unwrap().unwrap();
        assert_eq!(before["tasks_pending"], 1);

        let done = db.complete_task(task_id).await.unwrap().unwrap();
        assert_eq!(done["status"], "completed");
        assert!(!done["completed_at"].is_null());

        let after = db.get_member_by_id(member_id).await.unwrap().unwrap();
        assert_eq!(after["tasks_completed"], 1);
        assert_eq!(after["tasks_pending"], 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_fault() {
        let db = MemoryDatabase::new();
        db.create_member(&member("A", "a@b.org"), &[]).await.unwrap();

        let chore: TaskCreateRequest =
            serde_json::from_value(json!({"title": "Church tour"})).unwrap();
        let err = db
            .create_member(&member("B", "a@b.org"), &[chore])
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Conflict(_)));
        assert!(db.get_all_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn starter_tasks_belong_to_the_new_member() {
        let db = MemoryDatabase::new();
        let tasks: Vec<TaskCreateRequest> = ["Send welcome packet", "Church tour"]
            .iter()
            .map(|title| serde_json::from_value(json!({"title": title, "member_id": 999})).unwrap())
            .collect();

        let created = db.create_member(&member("Tabitha", "tabitha@church.org"), &tasks).await.unwrap();
        assert_eq!(created["tasks_pending"], 2);

        let id = created["id"].as_i64().unwrap();
        let stored = db.get_member_tasks(id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["member"]["name"], "Tabitha");
    }

    #[tokio::test]
    async fn unknown_task_member_is_missing() {
        let db = MemoryDatabase::new();
        let task: TaskCreateRequest =
            serde_json::from_value(json!({"title": "Set up chairs", "member_id": 5})).unwrap();
        let err = db.create_task(&task).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Missing(_)));
    }

    #[tokio::test]
    async fn group_leader_is_listed_as_member() {
        let db = MemoryDatabase::new();
        let leader = db.create_member(&member("Paul", "paul@church.org"), &[]).await.unwrap();
        let group: GroupCreateRequest = serde_json::from_value(json!({
            "name": "Ushers",
            "group_type": "ushers",
            "leader_id": leader["id"],
        }))
        .unwrap();

        let group = db.create_group(&group).await.unwrap();
        assert_eq!(group["members_count"], 1);
        assert_eq!(group["leader"]["name"], "Paul");
    }

    #[tokio::test]
    async fn events_embed_their_groups() {
        let db = MemoryDatabase::new();
        let group: GroupCreateRequest =
            serde_json::from_value(json!({"name": "Choir", "group_type": "worship"})).unwrap();
        let group = db.create_group(&group).await.unwrap();

        let event: EventCreateRequest = serde_json::from_value(json!({
            "title": "Easter",
            "start_date": "2025-04-20T09:00:00Z",
            "group_ids": [group["id"]],
        }))
        .unwrap();
        let event = db.create_event(&event).await.unwrap();
        assert_eq!(event["groups"][0]["name"], "Choir");
        assert_eq!(event["status"], "draft");
    }
}
