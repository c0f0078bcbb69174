pub(crate) mod handler;
mod model;

pub use handler::{create_group, get_groups};
pub use model::{GroupCreateRequest, GroupResponse};
