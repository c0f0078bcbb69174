use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use super::{Database, DbResult};
use crate::config::Config;
use crate::routes::{
    event::EventCreateRequest, group::GroupCreateRequest, member::MemberCreateRequest,
    task::TaskCreateRequest,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    role TEXT NOT NULL DEFAULT 'member',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE TABLE IF NOT EXISTS groups (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    group_type TEXT NOT NULL,
    leader_id BIGINT REFERENCES members(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE TABLE IF NOT EXISTS group_members (
    group_id BIGINT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    member_id BIGINT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (group_id, member_id)
);
CREATE TABLE IF NOT EXISTS events (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    start_date TIMESTAMPTZ NOT NULL,
    end_date TIMESTAMPTZ,
    location TEXT,
    status TEXT NOT NULL DEFAULT 'draft',
    max_attendees BIGINT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE TABLE IF NOT EXISTS event_groups (
    event_id BIGINT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    group_id BIGINT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    PRIMARY KEY (event_id, group_id)
);
CREATE TABLE IF NOT EXISTS event_attendees (
    event_id BIGINT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    member_id BIGINT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (event_id, member_id)
);
CREATE TABLE IF NOT EXISTS tasks (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    member_id BIGINT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'pending',
    priority TEXT NOT NULL DEFAULT 'medium',
    due_date TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

const EVENT_JSON: &str = r#"
SELECT json_build_object(
    'id', e.id,
    'title', e.title,
    'description', e.description,
    'start_date', e.start_date,
    'end_date', e.end_date,
    'location', e.location,
    'status', e.status,
    'max_attendees', e.max_attendees,
    'created_at', e.created_at,
    'updated_at', e.updated_at,
    'groups', COALESCE((
        SELECT json_agg(json_build_object('id', g.id, 'name', g.name, 'group_type', g.group_type) ORDER BY g.name)
        FROM event_groups eg JOIN groups g ON g.id = eg.group_id
        WHERE eg.event_id = e.id
    ), '[]'::json),
    'attendees_count', (SELECT COUNT(*) FROM event_attendees ea WHERE ea.event_id = e.id)
)
FROM events e
"#;

const MEMBER_JSON: &str = r#"
SELECT json_build_object(
    'id', m.id,
    'name', m.name,
    'email', m.email,
    'phone', m.phone,
    'role', m.role,
    'created_at', m.created_at,
    'updated_at', m.updated_at,
    'groups', COALESCE((
        SELECT json_agg(json_build_object('id', g.id, 'name', g.name, 'group_type', g.group_type) ORDER BY g.name)
        FROM group_members gm JOIN groups g ON g.id = gm.group_id
        WHERE gm.member_id = m.id
    ), '[]'::json),
    'tasks_completed', (SELECT COUNT(*) FROM tasks t WHERE t.member_id = m.id AND t.status = 'completed'),
    'tasks_pending', (SELECT COUNT(*) FROM tasks t WHERE t.member_id = m.id AND t.status <> 'completed')
)
FROM members m
"#;

const GROUP_JSON: &str = r#"
SELECT json_build_object(
    'id', g.id,
    'name', g.name,
    'description', g.description,
    'group_type', g.group_type,
    'created_at', g.created_at,
    'updated_at', g.updated_at,
    'leader', (SELECT json_build_object('id', l.id, 'name', l.name, 'email', l.email) FROM members l WHERE l.id = g.leader_id),
    'members_count', (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id = g.id),
    'members', COALESCE((
        SELECT json_agg(json_build_object('id', m.id, 'name', m.name, 'email', m.email, 'role', m.role) ORDER BY m.name)
        FROM group_members gm JOIN members m ON m.id = gm.member_id
        WHERE gm.group_id = g.id
    ), '[]'::json)
)
FROM groups g
"#;

const TASK_JSON: &str = r#"
SELECT json_build_object(
    'id', t.id,
    'title', t.title,
    'description', t.description,
    'status', t.status,
    'priority', t.priority,
    'due_date', t.due_date,
    'completed_at', t.completed_at,
    'created_at', t.created_at,
    'updated_at', t.updated_at,
    'member', (SELECT json_build_object('id', m.id, 'name', m.name, 'email', m.email) FROM members m WHERE m.id = t.member_id)
)
FROM tasks t
"#;

#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub async fn connect(config: &Config, database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'ecclesiaflow_backend';")
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    async fn fetch_all(&self, sql: &str) -> DbResult<Vec<Value>> {
        let rows = sqlx::query_scalar::<_, Value>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_by_id(&self, sql: &str, id: i64) -> DbResult<Option<Value>> {
        let row = sqlx::query_scalar::<_, Value>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn fetch_created(&self, sql: &str, id: i64) -> DbResult<Value> {
        self.fetch_by_id(sql, id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound.into())
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn get_all_events(&self) -> DbResult<Vec<Value>> {
        self.fetch_all(&format!("{EVENT_JSON} ORDER BY e.start_date")).await
    }

    async fn get_event_by_id(&self, event_id: i64) -> DbResult<Option<Value>> {
        self.fetch_by_id(&format!("{EVENT_JSON} WHERE e.id = $1"), event_id)
            .await
    }

    async fn create_event(&self, event: &EventCreateRequest) -> DbResult<Value> {
        let mut tx = self.pool.begin().await?;

        let event_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO events (title, description, start_date, end_date, location, max_attendees)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.location)
        .bind(event.max_attendees)
        .fetch_one(&mut *tx)
        .await?;

        for group_id in &event.group_ids {
            sqlx::query(
                "INSERT INTO event_groups (event_id, group_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(event_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(event_id, "event stored");

        self.fetch_created(&format!("{EVENT_JSON} WHERE e.id = $1"), event_id)
            .await
    }

    async fn get_all_members(&self) -> DbResult<Vec<Value>> {
        self.fetch_all(&format!("{MEMBER_JSON} ORDER BY m.name")).await
    }

    async fn create_member(
        &self,
        member: &MemberCreateRequest,
        starter_tasks: &[TaskCreateRequest],
    ) -> DbResult<Value> {
        let mut tx = self.pool.begin().await?;

        let member_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO members (name, email, phone, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member.role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for group_id in &member.group_ids {
            sqlx::query(
                "INSERT INTO group_members (group_id, member_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(group_id)
            .bind(member_id)
            .execute(&mut *tx)
            .await?;
        }

        for task in starter_tasks {
            sqlx::query(
                r#"
                INSERT INTO tasks (title, description, member_id, due_date, priority)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&task.title)
            .bind(&task.description)
            .bind(member_id)
            .bind(task.due_date)
            .bind(&task.priority)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(member_id, tasks = starter_tasks.len(), "member stored");

        self.fetch_created(&format!("{MEMBER_JSON} WHERE m.id = $1"), member_id)
            .await
    }

    async fn get_member_by_id(&self, member_id: i64) -> DbResult<Option<Value>> {
        self.fetch_by_id(&format!("{MEMBER_JSON} WHERE m.id = $1"), member_id)
            .await
    }

    async fn get_member_tasks(&self, member_id: i64) -> DbResult<Vec<Value>> {
        let rows = sqlx::query_scalar::<_, Value>(&format!(
            "{TASK_JSON} WHERE t.member_id = $1 ORDER BY t.created_at"
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_all_groups(&self) -> DbResult<Vec<Value>> {
        self.fetch_all(&format!("{GROUP_JSON} ORDER BY g.name")).await
    }

    async fn create_group(&self, group: &GroupCreateRequest) -> DbResult<Value> {
        let mut tx = self.pool.begin().await?;

        let group_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO groups (name, description, group_type, leader_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&group.name)
        .bind(&group.description)
        .bind(&group.group_type)
        .bind(group.leader_id)
        .fetch_one(&mut *tx)
        .await?;

        // the leader is always part of the group
        if let Some(leader_id) = group.leader_id {
            sqlx::query(
                "INSERT INTO group_members (group_id, member_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(group_id)
            .bind(leader_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.fetch_created(&format!("{GROUP_JSON} WHERE g.id = $1"), group_id)
            .await
    }

    async fn get_all_tasks(&self) -> DbResult<Vec<Value>> {
        self.fetch_all(&format!("{TASK_JSON} ORDER BY t.created_at")).await
    }

    async fn create_task(&self, task: &TaskCreateRequest) -> DbResult<Value> {
        let task_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tasks (title, description, member_id, due_date, priority)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.member_id)
        .bind(task.due_date)
        .bind(&task.priority)
        .fetch_one(&self.pool)
        .await?;

        self.fetch_created(&format!("{TASK_JSON} WHERE t.id = $1"), task_id)
            .await
    }

    async fn complete_task(&self, task_id: i64) -> DbResult<Option<Value>> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE tasks
            SET status = 'completed',
                completed_at = COALESCE(completed_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.fetch_by_id(&format!("{TASK_JSON} WHERE t.id = $1"), id).await,
            None => Ok(None),
        }
    }
}
