pub(crate) mod handler;
mod model;

pub use handler::get_agent_status;
pub use model::{AgentStatus, AgentSystemStatus};
