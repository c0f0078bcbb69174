pub(crate) mod handler;
mod model;

pub use handler::{create_member, get_member_tasks, get_members};
pub use model::{MemberCreateRequest, MemberResponse, MemberRole};
