pub(crate) mod handler;

pub use handler::{HealthResponse, ServiceInfo, health_check, not_found, root};
