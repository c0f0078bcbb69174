pub(crate) mod handler;
mod model;

pub use handler::{complete_task, create_task, get_tasks};
pub use model::{TaskCreateRequest, TaskResponse, TaskStatus};
