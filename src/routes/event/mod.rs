pub(crate) mod handler;
mod model;

pub use handler::{create_event, get_event, get_events};
pub use model::{EventCreateRequest, EventResponse, EventStatus};
