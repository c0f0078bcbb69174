// Persistence collaborator.
// Records come back as JSON objects already laid out like the response
// schemas; the routes layer shapes them.

mod memory;
mod postgres;

pub use memory::MemoryDatabase;
pub use postgres::PgDatabase;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CollaboratorError;
use crate::routes::{
    event::EventCreateRequest, group::GroupCreateRequest, member::MemberCreateRequest,
    task::TaskCreateRequest,
};

pub type DbResult<T> = Result<T, CollaboratorError>;

#[async_trait]
pub trait Database: Send + Sync {
    async fn get_all_events(&self) -> DbResult<Vec<Value>>;
    async fn get_event_by_id(&self, event_id: i64) -> DbResult<Option<Value>>;
    async fn create_event(&self, event: &EventCreateRequest) -> DbResult<Value>;

    async fn get_all_members(&self) -> DbResult<Vec<Value>>;
    /// Stores the member together with its starter tasks, all or nothing.
    /// Each task's `member_id` is replaced by the new member's id.
    async fn create_member(
        &self,
        member: &MemberCreateRequest,
        starter_tasks: &[TaskCreateRequest],
    ) -> DbResult<Value>;
    async fn get_member_by_id(&self, member_id: i64) -> DbResult<Option<Value>>;
    async fn get_member_tasks(&self, member_id: i64) -> DbResult<Vec<Value>>;

    async fn get_all_groups(&self) -> DbResult<Vec<Value>>;
    async fn create_group(&self, group: &GroupCreateRequest) -> DbResult<Value>;

    async fn get_all_tasks(&self) -> DbResult<Vec<Value>>;
    async fn create_task(&self, task: &TaskCreateRequest) -> DbResult<Value>;
    /// Marks the task completed and stamps `completed_at`. `None` when no
    /// task has that id.
    async fn complete_task(&self, task_id: i64) -> DbResult<Option<Value>>;
}
